//! Reader for OpenMS TextExporter output.
//!
//! A feature or consensus export carries `#`-prefixed header lines followed
//! by one aggregate line per element, each optionally trailed by a PEPTIDE
//! identification line. The reader pairs every aggregate line with its
//! identification and substitutes placeholder values when none follows.
//! Identification-only exports carry no element header at all and are read
//! line by line against a fixed thirteen-column layout.

use std::io::{BufRead, Lines};

use log::info;

use crate::cancel::CancelToken;
use crate::data::CoercePolicy;
use crate::error::ReadError;
use crate::rows::coerce_fields;
use crate::schema::{Column, ColumnType, Schema, TypeRules, schema_from_header};
use crate::sniff::{DEFAULT_SEPARATOR, sniff_separator};
use crate::table::{Row, Table, TableBuilder};

/// Which element rows to extract from a TextExporter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextExportKind {
    Feature,
    Consensus,
    Peptides,
}

impl TextExportKind {
    pub fn tag(self) -> &'static str {
        match self {
            TextExportKind::Feature => "FEATURE",
            TextExportKind::Consensus => "CONSENSUS",
            TextExportKind::Peptides => "PEPTIDE",
        }
    }
}

const DETAIL_WIDTH: usize = 13;

/// Placeholder identification joined onto elements without a PEPTIDE line.
const DETAIL_FILLER: [&str; DETAIL_WIDTH] = [
    "0",
    "0",
    "0",
    "-1",
    "UNIDENTIFIED_PEPTIDE",
    "0",
    "",
    "",
    "",
    "",
    "UNIDENTIFIED_PROTEIN",
    "",
    "",
];

fn detail_columns() -> Vec<Column> {
    vec![
        Column::new("peptide_rt", ColumnType::Double),
        Column::new("peptide_mz", ColumnType::Double),
        Column::new("score", ColumnType::Double),
        Column::new("rank", ColumnType::Integer),
        Column::new("sequence", ColumnType::String),
        Column::new("peptide_charge", ColumnType::Integer),
        Column::new("aa_before", ColumnType::String),
        Column::new("aa_after", ColumnType::String),
        Column::new("score_type", ColumnType::String),
        Column::new("search_identifier", ColumnType::String),
        Column::new("accessions", ColumnType::String),
        Column::new("start", ColumnType::String),
        Column::new("end", ColumnType::String),
    ]
}

/// Reads one TextExporter file into a table of `kind` elements.
///
/// Feature and consensus tables get the columns of the element header plus
/// the thirteen identification columns; peptide tables get only the latter.
pub fn read_text_export(
    kind: TextExportKind,
    input: impl BufRead,
    cancel: &CancelToken,
) -> Result<Table, ReadError> {
    let tag = kind.tag();
    let element_prefix = format!("#{tag}");
    let mut lines = input.lines();
    let mut line_no: u64 = 0;

    let mut element_header: Option<String> = None;
    let mut last_header = String::new();
    let mut saw_structural = false;
    let mut first_data: Option<(String, u64)> = None;

    for line in lines.by_ref() {
        let line = line?;
        line_no += 1;
        if !line.starts_with('#') {
            first_data = Some((line, line_no));
            break;
        }
        if line.starts_with(&element_prefix) {
            element_header = Some(line.clone());
        }
        if line.starts_with("#MAP")
            || line.starts_with("#FEATURE")
            || line.starts_with("#CONSENSUS")
        {
            saw_structural = true;
        }
        last_header = line;
    }

    let untagged = element_header.is_none();
    let (schema, separator) = match element_header {
        Some(header) => {
            let separator = sniff_separator(&header, tag, DEFAULT_SEPARATOR);
            let schema = if kind == TextExportKind::Peptides {
                Schema::new(detail_columns())
            } else {
                let mut schema =
                    schema_from_header(&header, separator, true, &TypeRules::text_export());
                schema.columns.extend(detail_columns());
                schema
            };
            (schema, separator)
        }
        None if kind == TextExportKind::Peptides && !saw_structural => {
            let separator = sniff_separator(&last_header, tag, DEFAULT_SEPARATOR);
            (Schema::new(detail_columns()), separator)
        }
        None if kind == TextExportKind::Peptides => {
            return Err(ReadError::InvalidHeader(
                "No peptide data found. Run TextExporter without no_id and without proteins_only."
                    .to_string(),
            ));
        }
        None => {
            return Err(ReadError::InvalidHeader(format!(
                "No {element_prefix} header found in the input"
            )));
        }
    };

    let columns = schema.columns.clone();
    let aggregate_len = columns.len() - DETAIL_WIDTH;
    let (aggregate, detail) = columns.split_at(aggregate_len);
    let policy = CoercePolicy::text_export();
    let mut builder = TableBuilder::new(schema);

    if kind == TextExportKind::Peptides {
        let mut current = first_data;
        while let Some((line, at)) = current {
            cancel.check()?;
            let wanted = if untagged {
                !line.trim().is_empty()
            } else {
                line.starts_with(tag)
            };
            if wanted {
                let tokens: Vec<&str> = line.split(separator).collect();
                let values = detail_values(&tokens, usize::from(!untagged), at)?;
                builder.push(Row::new(coerce_fields(detail, values, at, &policy)?));
            }
            current = next_line(&mut lines, &mut line_no)?;
        }
    } else {
        let mut joiner = PairedJoiner {
            aggregate,
            detail,
            separator,
            policy: &policy,
            pending: None,
        };
        let mut current = first_data;
        while let Some((line, at)) = current {
            cancel.check()?;
            if line.starts_with(tag) {
                if let Some(row) = joiner.offer_element(line, at)? {
                    builder.push(row);
                }
            } else if line.starts_with("PEPTIDE") {
                if let Some(row) = joiner.offer_identification(&line, at)? {
                    builder.push(row);
                }
            }
            current = next_line(&mut lines, &mut line_no)?;
        }
        if let Some(row) = joiner.flush()? {
            builder.push(row);
        }
    }

    Ok(builder.finish())
}

fn next_line<B: BufRead>(
    lines: &mut Lines<B>,
    line_no: &mut u64,
) -> Result<Option<(String, u64)>, ReadError> {
    match lines.next() {
        Some(line) => {
            let line = line?;
            *line_no += 1;
            Ok(Some((line, *line_no)))
        }
        None => Ok(None),
    }
}

/// Returns a peptide line's thirteen value tokens, dropping the two or four
/// rt/pt prediction extras some exports append.
fn detail_values<'a>(
    tokens: &'a [&'a str],
    tag_offset: usize,
    at: u64,
) -> Result<&'a [&'a str], ReadError> {
    match tokens.len().saturating_sub(tag_offset) {
        13 | 15 | 17 => Ok(&tokens[tag_offset..tag_offset + DETAIL_WIDTH]),
        _ => Err(ReadError::UnknownDetailLayout {
            line: at,
            actual: tokens.len(),
        }),
    }
}

/// Pairs each element line with the identification line that follows it.
///
/// Holds at most one element at a time: a new element or the end of input
/// flushes the held one with placeholder identification values, and an
/// identification arriving with nothing held is dropped.
struct PairedJoiner<'a> {
    aggregate: &'a [Column],
    detail: &'a [Column],
    separator: &'a str,
    policy: &'a CoercePolicy,
    pending: Option<(String, u64)>,
}

impl PairedJoiner<'_> {
    fn offer_element(&mut self, line: String, at: u64) -> Result<Option<Row>, ReadError> {
        let flushed = self.flush()?;
        self.pending = Some((line, at));
        Ok(flushed)
    }

    fn offer_identification(&mut self, line: &str, at: u64) -> Result<Option<Row>, ReadError> {
        match self.pending.take() {
            Some((held, held_at)) => Ok(Some(self.join(&held, held_at, Some((line, at)))?)),
            None => {
                info!("Found two identifications for last consensus element. Will ignore second.");
                Ok(None)
            }
        }
    }

    fn flush(&mut self) -> Result<Option<Row>, ReadError> {
        match self.pending.take() {
            Some((held, held_at)) => Ok(Some(self.join(&held, held_at, None)?)),
            None => Ok(None),
        }
    }

    fn join(
        &self,
        element: &str,
        element_at: u64,
        identification: Option<(&str, u64)>,
    ) -> Result<Row, ReadError> {
        let tokens: Vec<&str> = element.split(self.separator).collect();
        let values = &tokens[1..];
        if values.len() != self.aggregate.len() {
            return Err(ReadError::LineWidth {
                line: element_at,
                expected: self.aggregate.len(),
                actual: values.len(),
                content: element.to_string(),
            });
        }
        let mut cells = coerce_fields(self.aggregate, values, element_at, self.policy)?;
        match identification {
            Some((line, at)) => {
                let tokens: Vec<&str> = line.split(self.separator).collect();
                let values = detail_values(&tokens, 1, at)?;
                cells.extend(coerce_fields(self.detail, values, at, self.policy)?);
            }
            None => {
                cells.extend(coerce_fields(
                    self.detail,
                    &DETAIL_FILLER,
                    element_at,
                    self.policy,
                )?);
            }
        }
        Ok(Row::new(cells))
    }
}
