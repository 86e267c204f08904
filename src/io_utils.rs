//! I/O plumbing for the readers and sinks.
//!
//! All file access flows through this module. It provides:
//!
//! - **Input resolution**: exactly one input path per read, with the `-`
//!   path convention routing through standard streams.
//! - **Encoding**: input decoding via `encoding_rs` / `encoding_rs_io`,
//!   defaulting to UTF-8 with BOM detection; output is always UTF-8.
//! - **Writer construction**: buffered file-or-stdout writers, with CSV
//!   output quoting every field for round-trip safety.
//! - **Delimiter resolution**: extension-based auto-detection for output
//!   (`.csv` → comma, `.tsv` → tab) with manual override support.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::error::ReadError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

/// Enforces the one-file contract shared by every reader command.
pub fn resolve_single_input(inputs: &[PathBuf]) -> Result<&Path, ReadError> {
    match inputs {
        [] => Err(ReadError::MissingInput),
        [single] => Ok(single.as_path()),
        more => Err(ReadError::MultipleInputs(more.len())),
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Opens a path (or stdin for `-`) as decoded UTF-8 text.
///
/// A byte-order mark wins over the requested encoding, so UTF-16 exports
/// decode correctly even when the caller left the default in place.
pub fn open_text_reader(path: &Path, encoding: &'static Encoding) -> Result<Box<dyn BufRead>> {
    let raw: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(path).with_context(|| format!("Opening input file {path:?}"))?)
    };
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .bom_override(true)
        .build(raw);
    Ok(Box::new(BufReader::new(decoded)))
}

pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => return DEFAULT_TSV_DELIMITER,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => return DEFAULT_CSV_DELIMITER,
            _ => {}
        }
    }
    fallback
}

pub fn open_output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(io::stdout())),
    }
}

pub fn open_csv_writer(
    path: Option<&Path>,
    delimiter: u8,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let base = open_output_writer(path)?;
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(base))
}
