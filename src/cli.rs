use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Read OpenMS text exports into typed tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read a TextExporter feature file into one typed table
    Feature(ReadArgs),
    /// Read a TextExporter consensus file, joining PEPTIDE identification lines
    Consensus(ReadArgs),
    /// Read a peptide-only TextExporter file
    Peptides(ReadArgs),
    /// Split an mzTab file into its metadata and content section tables
    Mztab(MzTabArgs),
    /// Read the small molecule section of an mzTab file
    SmallMolecules(SmallMoleculeArgs),
    /// Read a QC metric TSV file produced by QCCalculator
    Qc(QcArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Csv
    }
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Input file to read ('-' for stdin); exactly one is required
    #[arg(short = 'i', long = "input", action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Delimiter for delimited output (defaults by output extension)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct MzTabArgs {
    /// Input mzTab file to read ('-' for stdin); exactly one is required
    #[arg(short = 'i', long = "input", action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Directory receiving one output file per section
    #[arg(short = 'o', long = "out-dir")]
    pub out_dir: PathBuf,
    /// Output format for the section tables
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Delimiter for delimited output files
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct SmallMoleculeArgs {
    /// Input mzTab file to read ('-' for stdin); exactly one is required
    #[arg(short = 'i', long = "input", action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Delimiter for delimited output (defaults by output extension)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Keep optional columns appearing after the canonical ones
    #[arg(long = "include-optional")]
    pub include_optional: bool,
    /// Do not require the file to open with an MTD version line
    #[arg(long = "skip-version-check")]
    pub skip_version_check: bool,
    /// Build the schema from the file header instead of the canonical layout
    #[arg(long = "infer-schema")]
    pub infer_schema: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum QcKind {
    Precursors,
    Ids,
    IonInjectionTimes,
}

#[derive(Debug, Args)]
pub struct QcArgs {
    /// Input TSV file to read ('-' for stdin); exactly one is required
    #[arg(short = 'i', long = "input", action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Which QC metric file layout to expect
    #[arg(long, value_enum)]
    pub kind: QcKind,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Delimiter for delimited output (defaults by output extension)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
