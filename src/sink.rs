//! Writers turning closed tables into delimited text or JSON.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::cli::OutputFormat;
use crate::data::Cell;
use crate::io_utils;
use crate::mztab::MzTabTables;
use crate::schema::Schema;
use crate::table::{Row, Table};

/// Writes one table to `path` (stdout when omitted) in the chosen format.
pub fn write_table(
    table: &Table,
    path: Option<&Path>,
    format: OutputFormat,
    delimiter: u8,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut writer = io_utils::open_csv_writer(path, delimiter)?;
            write_delimited(table, &mut writer)
        }
        OutputFormat::Json => {
            let writer = io_utils::open_output_writer(path)?;
            write_json(table, writer)
        }
    }
}

/// Writes the five section tables as separate files under `out_dir`.
pub fn write_mztab_tables(
    tables: &MzTabTables,
    out_dir: &Path,
    format: OutputFormat,
    delimiter: u8,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Creating output directory {out_dir:?}"))?;
    let sections = [
        ("metadata", &tables.metadata),
        ("proteins", &tables.proteins),
        ("peptides", &tables.peptides),
        ("psms", &tables.psms),
        ("small_molecules", &tables.small_molecules),
    ];
    for (stem, table) in sections {
        let path = out_dir.join(format!("{stem}.{}", format.extension()));
        write_table(table, Some(&path), format, delimiter)
            .with_context(|| format!("Writing {stem} table"))?;
    }
    Ok(())
}

pub fn write_delimited<W: Write>(table: &Table, writer: &mut csv::Writer<W>) -> Result<()> {
    writer
        .write_record(table.schema().headers().iter())
        .context("Writing output headers")?;
    for row in table.rows() {
        let values: Vec<String> = row.cells().iter().map(Cell::as_display).collect();
        writer
            .write_record(values.iter())
            .context("Writing output row")?;
    }
    writer.flush().context("Flushing output writer")?;
    Ok(())
}

/// Rows as an array of objects keyed by column name. Missing cells and
/// non-finite doubles come out as `null`.
pub fn write_json(table: &Table, writer: impl Write) -> Result<()> {
    let rows: Vec<JsonRow<'_>> = table
        .rows()
        .iter()
        .map(|row| JsonRow {
            schema: table.schema(),
            row,
        })
        .collect();
    serde_json::to_writer_pretty(writer, &rows).context("Writing JSON output")
}

struct JsonRow<'a> {
    schema: &'a Schema,
    row: &'a Row,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.row.len()))?;
        for (column, cell) in self.schema.columns.iter().zip(self.row.cells()) {
            map.serialize_entry(&column.name, &JsonCell(cell))?;
        }
        map.end()
    }
}

struct JsonCell<'a>(&'a Cell);

impl Serialize for JsonCell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Cell::String(value) => serializer.serialize_str(value),
            Cell::Integer(value) => serializer.serialize_i64(*value),
            Cell::Double(value) => FiniteDouble(*value).serialize(serializer),
            Cell::Boolean(value) => serializer.serialize_bool(*value),
            Cell::DoubleList(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(&FiniteDouble(*value))?;
                }
                seq.end()
            }
            Cell::Missing(_) => serializer.serialize_none(),
        }
    }
}

struct FiniteDouble(f64);

impl Serialize for FiniteDouble {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType};
    use crate::table::TableBuilder;

    fn sample_table() -> Table {
        let schema = Schema::new(vec![
            Column::new("name", ColumnType::String),
            Column::new("rt", ColumnType::Double),
            Column::new("charge", ColumnType::Integer),
            Column::new("times", ColumnType::DoubleList),
        ]);
        let mut builder = TableBuilder::new(schema);
        builder.push(Row::new(vec![
            Cell::String("pep".into()),
            Cell::Double(12.5),
            Cell::Integer(2),
            Cell::DoubleList(vec![1.0, 2.5]),
        ]));
        builder.push(Row::new(vec![
            Cell::Missing("null".into()),
            Cell::Double(f64::INFINITY),
            Cell::Integer(-1),
            Cell::DoubleList(vec![]),
        ]));
        builder.finish()
    }

    #[test]
    fn delimited_output_quotes_every_field() {
        let table = sample_table();
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(vec![]);
        write_delimited(&table, &mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("\"name\",\"rt\",\"charge\",\"times\""));
        assert_eq!(lines.next(), Some("\"pep\",\"12.5\",\"2\",\"1|2.5\""));
        assert_eq!(lines.next(), Some("\"\",\"inf\",\"-1\",\"\""));
    }

    #[test]
    fn json_output_uses_null_for_missing_and_non_finite() {
        let table = sample_table();
        let mut buffer = Vec::new();
        write_json(&table, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value[0]["name"], serde_json::json!("pep"));
        assert_eq!(value[0]["rt"], serde_json::json!(12.5));
        assert_eq!(value[0]["times"], serde_json::json!([1.0, 2.5]));
        assert_eq!(value[1]["name"], serde_json::Value::Null);
        assert_eq!(value[1]["rt"], serde_json::Value::Null);
        assert_eq!(value[1]["charge"], serde_json::json!(-1));
    }

    #[test]
    fn mztab_sections_land_in_one_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tables = MzTabTables {
            metadata: sample_table(),
            proteins: Table::empty(Schema::empty()),
            peptides: Table::empty(Schema::empty()),
            psms: Table::empty(Schema::empty()),
            small_molecules: Table::empty(Schema::empty()),
        };
        write_mztab_tables(&tables, dir.path(), OutputFormat::Csv, b',').unwrap();
        for stem in ["metadata", "proteins", "peptides", "psms", "small_molecules"] {
            assert!(dir.path().join(format!("{stem}.csv")).exists());
        }
    }
}
