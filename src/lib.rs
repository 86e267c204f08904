pub mod cancel;
pub mod cli;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod mztab;
pub mod process;
pub mod qc;
pub mod rows;
pub mod schema;
pub mod sink;
pub mod sniff;
pub mod table;
pub mod text_export;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};
use crate::text_export::TextExportKind;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("mstab", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Feature(args) => process::execute_text_export(TextExportKind::Feature, &args),
        Commands::Consensus(args) => process::execute_text_export(TextExportKind::Consensus, &args),
        Commands::Peptides(args) => process::execute_text_export(TextExportKind::Peptides, &args),
        Commands::Mztab(args) => process::execute_mztab(&args),
        Commands::SmallMolecules(args) => process::execute_small_molecules(&args),
        Commands::Qc(args) => process::execute_qc(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
