//! Token-level parsing of a single data line against a schema.

use crate::data::{Cell, CoercePolicy, coerce};
use crate::error::ReadError;
use crate::schema::{Column, Schema};
use crate::table::Row;

/// Coerces one field per column; callers validate widths beforehand.
pub fn coerce_fields(
    columns: &[Column],
    fields: &[&str],
    line_no: u64,
    policy: &CoercePolicy,
) -> Result<Vec<Cell>, ReadError> {
    debug_assert_eq!(columns.len(), fields.len());
    let mut cells = Vec::with_capacity(columns.len());
    for (column, raw) in columns.iter().zip(fields) {
        let cell = coerce(raw, column.datatype, policy).map_err(|err| ReadError::Coercion {
            line: line_no,
            column: column.name.clone(),
            datatype: err.datatype,
            raw: err.raw,
        })?;
        cells.push(cell);
    }
    Ok(cells)
}

/// How strictly a line's token count must match the schema width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Token count must equal the schema width exactly.
    Exact,
    /// Extra trailing tokens are ignored.
    AtLeast,
}

/// Splits one data line and coerces its fields into a typed [`Row`].
pub struct LineParser<'a> {
    schema: &'a Schema,
    policy: CoercePolicy,
    separator: &'a str,
    leading_fields_to_skip: usize,
    cardinality: Cardinality,
}

impl<'a> LineParser<'a> {
    pub fn new(schema: &'a Schema, policy: CoercePolicy, separator: &'a str) -> Self {
        Self {
            schema,
            policy,
            separator,
            leading_fields_to_skip: 0,
            cardinality: Cardinality::Exact,
        }
    }

    /// Ignores this many tokens at the start of every line, e.g. a section tag.
    pub fn skip_leading(mut self, count: usize) -> Self {
        self.leading_fields_to_skip = count;
        self
    }

    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Parses one line into a row. A trailing separator yields an empty final
    /// token that counts toward the width check.
    pub fn parse(&self, line: &str, line_no: u64) -> Result<Row, ReadError> {
        let tokens: Vec<&str> = line.split(self.separator).collect();
        let expected = self.schema.len();
        let available = tokens.len().saturating_sub(self.leading_fields_to_skip);
        let fits = match self.cardinality {
            Cardinality::Exact => available == expected,
            Cardinality::AtLeast => available >= expected,
        };
        if !fits {
            return Err(ReadError::LineWidth {
                line: line_no,
                expected,
                actual: available,
                content: line.to_string(),
            });
        }
        let start = self.leading_fields_to_skip;
        let fields = tokens.get(start..start + expected).unwrap_or(&[]);
        let cells = coerce_fields(&self.schema.columns, fields, line_no, &self.policy)?;
        Ok(Row::new(cells))
    }
}
