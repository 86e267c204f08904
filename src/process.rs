use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    cancel::CancelToken,
    cli::{MzTabArgs, OutputFormat, QcArgs, QcKind, ReadArgs, SmallMoleculeArgs},
    io_utils, mztab,
    mztab::{SchemaSource, SmallMoleculeOptions},
    qc,
    qc::{IdFormat, IonInjectionFormat, PrecursorFormat, QcFormat},
    sink,
    table::Table,
    text_export,
    text_export::TextExportKind,
};

pub fn execute_text_export(kind: TextExportKind, args: &ReadArgs) -> Result<()> {
    let input = io_utils::resolve_single_input(&args.inputs)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!("Reading {} export from '{}'", kind.tag(), input.display());
    let reader = io_utils::open_text_reader(input, encoding)?;
    let cancel = CancelToken::new();
    let table = text_export::read_text_export(kind, reader, &cancel)
        .with_context(|| format!("Reading {input:?}"))?;
    info!(
        "Parsed {} row(s) across {} column(s)",
        table.len(),
        table.schema().len()
    );
    write_output(
        &table,
        args.output.as_deref(),
        args.format,
        args.output_delimiter,
    )
}

pub fn execute_mztab(args: &MzTabArgs) -> Result<()> {
    let input = io_utils::resolve_single_input(&args.inputs)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!("Reading mzTab sections from '{}'", input.display());
    let reader = io_utils::open_text_reader(input, encoding)?;
    let cancel = CancelToken::new();
    let tables =
        mztab::read_mztab(reader, &cancel).with_context(|| format!("Reading {input:?}"))?;
    info!(
        "Parsed {} metadata, {} protein, {} peptide, {} PSM, {} small molecule row(s)",
        tables.metadata.len(),
        tables.proteins.len(),
        tables.peptides.len(),
        tables.psms.len(),
        tables.small_molecules.len()
    );
    let delimiter = args
        .output_delimiter
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    sink::write_mztab_tables(&tables, &args.out_dir, args.format, delimiter)?;
    info!("Section tables written to {:?}", args.out_dir);
    Ok(())
}

pub fn execute_small_molecules(args: &SmallMoleculeArgs) -> Result<()> {
    let input = io_utils::resolve_single_input(&args.inputs)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let options = SmallMoleculeOptions {
        include_optional: args.include_optional,
        require_version_line: !args.skip_version_check,
        schema_source: if args.infer_schema {
            SchemaSource::Inferred
        } else {
            SchemaSource::Canonical
        },
    };
    info!("Reading small molecule section from '{}'", input.display());
    let reader = io_utils::open_text_reader(input, encoding)?;
    let cancel = CancelToken::new();
    let table = mztab::read_small_molecules(reader, &options, &cancel)
        .with_context(|| format!("Reading {input:?}"))?;
    info!(
        "Parsed {} row(s) across {} column(s)",
        table.len(),
        table.schema().len()
    );
    write_output(
        &table,
        args.output.as_deref(),
        args.format,
        args.output_delimiter,
    )
}

pub fn execute_qc(args: &QcArgs) -> Result<()> {
    let input = io_utils::resolve_single_input(&args.inputs)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dialect: &dyn QcFormat = match args.kind {
        QcKind::Precursors => &PrecursorFormat,
        QcKind::Ids => &IdFormat,
        QcKind::IonInjectionTimes => &IonInjectionFormat,
    };
    info!("Reading QC table from '{}'", input.display());
    let reader = io_utils::open_text_reader(input, encoding)?;
    let cancel = CancelToken::new();
    let table = qc::read_qc_table(dialect, reader, &cancel)
        .with_context(|| format!("Reading {input:?}"))?;
    info!(
        "Parsed {} row(s) across {} column(s)",
        table.len(),
        table.schema().len()
    );
    write_output(
        &table,
        args.output.as_deref(),
        args.format,
        args.output_delimiter,
    )
}

fn write_output(
    table: &Table,
    output: Option<&Path>,
    format: OutputFormat,
    delimiter_override: Option<u8>,
) -> Result<()> {
    let delimiter = io_utils::resolve_output_delimiter(
        output,
        delimiter_override,
        io_utils::DEFAULT_CSV_DELIMITER,
    );
    if format == OutputFormat::Csv {
        debug!(
            "Output delimiter '{}'",
            crate::printable_delimiter(delimiter)
        );
    }
    sink::write_table(table, output, format, delimiter)
}
