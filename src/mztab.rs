//! Readers for mzTab files.
//!
//! [`read_mztab`] demultiplexes the sections of an mzTab file into five
//! tables, building per-section schemas from the PRH/PEH/PSH/SMH header
//! lines. [`read_small_molecules`] is the single-table variant for small
//! molecule exports: by default it validates the SMH header name for name
//! against the canonical twenty-two column layout, skips everything before
//! it, and substitutes a placeholder for unparseable abundances.

use std::io::BufRead;

use log::warn;

use crate::cancel::CancelToken;
use crate::data::CoercePolicy;
use crate::error::ReadError;
use crate::rows::{Cardinality, LineParser};
use crate::schema::{Column, ColumnType, Schema, TypeRules, schema_from_header};
use crate::table::{Table, TableBuilder};

/// The five tables of an mzTab file. Sections absent from the file come
/// back as empty tables with empty schemas.
#[derive(Debug)]
pub struct MzTabTables {
    pub metadata: Table,
    pub proteins: Table,
    pub peptides: Table,
    pub psms: Table,
    pub small_molecules: Table,
}

fn metadata_schema() -> Schema {
    Schema::new(vec![
        Column::new("fieldname", ColumnType::String),
        Column::new("value", ColumnType::String),
    ])
}

/// Reads a whole mzTab file, one pass, any section order.
///
/// Metadata lines become fieldname/value rows. Every other known section
/// needs its header line before its first data line; unknown identifiers
/// such as `COM` are skipped.
pub fn read_mztab(input: impl BufRead, cancel: &CancelToken) -> Result<MzTabTables, ReadError> {
    let rules = TypeRules::mztab();
    let policy = CoercePolicy::mztab();

    let mut metadata = TableBuilder::new(metadata_schema());
    let mut proteins: Option<TableBuilder> = None;
    let mut peptides: Option<TableBuilder> = None;
    let mut psms: Option<TableBuilder> = None;
    let mut small_molecules: Option<TableBuilder> = None;

    let mut line_no: u64 = 0;
    for line in input.lines() {
        let line = line?;
        line_no += 1;
        cancel.check()?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(identifier) = trimmed.get(..3) else {
            return Err(ReadError::MalformedLine {
                line: line_no,
                content: line,
            });
        };
        match identifier {
            "MTD" => {
                let parser =
                    LineParser::new(metadata.schema(), policy.clone(), "\t").skip_leading(1);
                let row = parser.parse(&line, line_no)?;
                metadata.push(row);
            }
            "PRH" => proteins = Some(section_builder(&line, &rules)),
            "PRT" => section_row(&mut proteins, &line, line_no, "PRT", "PRH", &policy)?,
            "PEH" => peptides = Some(section_builder(&line, &rules)),
            "PEP" => section_row(&mut peptides, &line, line_no, "PEP", "PEH", &policy)?,
            "PSH" => psms = Some(section_builder(&line, &rules)),
            "PSM" => section_row(&mut psms, &line, line_no, "PSM", "PSH", &policy)?,
            "SMH" => small_molecules = Some(section_builder(&line, &rules)),
            "SML" => section_row(&mut small_molecules, &line, line_no, "SML", "SMH", &policy)?,
            _ => {}
        }
    }

    Ok(MzTabTables {
        metadata: metadata.finish(),
        proteins: close_section(proteins),
        peptides: close_section(peptides),
        psms: close_section(psms),
        small_molecules: close_section(small_molecules),
    })
}

fn section_builder(header_line: &str, rules: &TypeRules) -> TableBuilder {
    TableBuilder::new(schema_from_header(header_line, "\t", true, rules))
}

fn section_row(
    section: &mut Option<TableBuilder>,
    line: &str,
    line_no: u64,
    data_tag: &'static str,
    header_tag: &'static str,
    policy: &CoercePolicy,
) -> Result<(), ReadError> {
    let Some(builder) = section.as_mut() else {
        return Err(ReadError::SectionOrder {
            line: line_no,
            data_tag,
            header_tag,
        });
    };
    let parser = LineParser::new(builder.schema(), policy.clone(), "\t").skip_leading(1);
    let row = parser.parse(line, line_no)?;
    builder.push(row);
    Ok(())
}

fn close_section(section: Option<TableBuilder>) -> Table {
    section.map_or_else(|| Table::empty(Schema::empty()), TableBuilder::finish)
}

/// How the small-molecule reader obtains its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSource {
    /// Validate the header name for name against the canonical layout.
    Canonical,
    /// Build the schema from whatever the header declares.
    Inferred,
}

/// Knobs of the small-molecule reader. The defaults reproduce the strict
/// canonical behavior.
#[derive(Debug, Clone)]
pub struct SmallMoleculeOptions {
    /// Keep columns past the canonical block as string columns instead of
    /// dropping them with a warning.
    pub include_optional: bool,
    /// Require the file to open with an `MTD` line.
    pub require_version_line: bool,
    pub schema_source: SchemaSource,
}

impl Default for SmallMoleculeOptions {
    fn default() -> Self {
        Self {
            include_optional: false,
            require_version_line: true,
            schema_source: SchemaSource::Canonical,
        }
    }
}

const CANONICAL_SMALL_MOLECULE_NAMES: [&str; 22] = [
    "identifier",
    "unit_id",
    "chemical_formula",
    "smiles",
    "inchi_key",
    "description",
    "mass_to_charge",
    "charge",
    "retention_time",
    "taxid",
    "species",
    "database",
    "database_version",
    "reliability",
    "uri",
    "spectra_ref",
    "search_engine",
    "search_engine_score",
    "modifications",
    "smallmolecule_abundance_sub[1]",
    "smallmolecule_abundance_stdev_sub[1]",
    "smallmolecule_abundance_std_error_sub[1]",
];

/// Reads the small-molecule section of an mzTab file into one table.
pub fn read_small_molecules(
    input: impl BufRead,
    options: &SmallMoleculeOptions,
    cancel: &CancelToken,
) -> Result<Table, ReadError> {
    let rules = TypeRules::small_molecule();
    let mut lines = input.lines();
    let mut line_no: u64 = 0;

    if options.require_version_line {
        let first = match lines.next() {
            Some(line) => {
                line_no += 1;
                line?
            }
            None => String::new(),
        };
        if !first.trim().starts_with("MTD") {
            return Err(ReadError::InvalidHeader(
                "Invalid start of file: mzTab file should start with the line: \
                 'MTD\tmzTab-version\t1.0.0'"
                    .to_string(),
            ));
        }
    }

    let mut schema: Option<Schema> = None;
    for line in lines.by_ref() {
        let line = line?;
        line_no += 1;
        cancel.check()?;
        if line.trim().starts_with("SMH") {
            schema = Some(small_molecule_schema(&line, options, &rules)?);
            break;
        }
    }
    let Some(schema) = schema else {
        return Err(ReadError::InvalidHeader(
            "Invalid mzTab file: The file does not contain a small molecule header (SMH)"
                .to_string(),
        ));
    };

    let policy = CoercePolicy::small_molecule();
    let mut builder = TableBuilder::new(schema);
    for line in lines {
        let line = line?;
        line_no += 1;
        cancel.check()?;
        if !line.trim().starts_with("SML") {
            continue;
        }
        let parser = LineParser::new(builder.schema(), policy.clone(), "\t")
            .skip_leading(1)
            .cardinality(Cardinality::AtLeast);
        let row = parser.parse(&line, line_no)?;
        builder.push(row);
    }
    Ok(builder.finish())
}

fn small_molecule_schema(
    header_line: &str,
    options: &SmallMoleculeOptions,
    rules: &TypeRules,
) -> Result<Schema, ReadError> {
    if options.schema_source == SchemaSource::Inferred {
        return Ok(schema_from_header(header_line, "\t", true, rules));
    }

    let mut tokens: Vec<&str> = header_line.split('\t').collect();
    while tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    let names = &tokens[1..];
    let canonical_len = CANONICAL_SMALL_MOLECULE_NAMES.len();
    if names.len() < canonical_len {
        return Err(ReadError::HeaderWidth {
            expected: canonical_len,
            actual: names.len(),
        });
    }
    for (expected, actual) in CANONICAL_SMALL_MOLECULE_NAMES.iter().zip(names) {
        if expected != actual {
            return Err(ReadError::HeaderName {
                expected: (*expected).to_string(),
                actual: (*actual).to_string(),
            });
        }
    }

    let mut columns: Vec<Column> = CANONICAL_SMALL_MOLECULE_NAMES
        .iter()
        .map(|name| Column::new(*name, rules.classify(name)))
        .collect();
    let extras = &names[canonical_len..];
    if !extras.is_empty() {
        if options.include_optional {
            columns.extend(
                extras
                    .iter()
                    .map(|name| Column::new(*name, ColumnType::String)),
            );
        } else {
            warn!(
                "mzTab file contains optional columns. These will not be contained in the table. \
                 Use the \"include optional columns\" Option if you want those columns to show up \
                 in the result table."
            );
        }
    }
    Ok(Schema::new(columns))
}
