use std::fmt;

use itertools::Itertools;

use crate::schema::ColumnType;

/// One typed table cell. `Missing` keeps the raw token for diagnostics and
/// may appear in a column of any declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    DoubleList(Vec<f64>),
    Missing(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing(_))
    }

    /// Textual form used by the CSV sink: missing cells render empty,
    /// double lists render pipe-joined.
    pub fn as_display(&self) -> String {
        match self {
            Cell::String(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Double(f) => f.to_string(),
            Cell::Boolean(b) => b.to_string(),
            Cell::DoubleList(values) => values.iter().join("|"),
            Cell::Missing(_) => String::new(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// What a recognized sentinel in a double column turns into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SentinelAction {
    /// Keep the raw token as a missing cell
    Missing,
    /// Substitute a fixed placeholder value
    Substitute(f64),
}

/// Per-format missing-value conventions applied before type parsing.
#[derive(Debug, Clone)]
pub struct CoercePolicy {
    /// Sentinels recognized in integer, boolean, and double-list columns
    missing: &'static [&'static str],
    /// Additional sentinels recognized in double columns
    double_missing: &'static [&'static str],
    /// The literal lowercase `nan` reads as zero in numeric columns
    nan_token_is_zero: bool,
    double_sentinel: SentinelAction,
}

impl CoercePolicy {
    /// General mzTab sections: `null`/`-` everywhere, `INF`/`NaN` in doubles,
    /// all producing missing cells.
    pub fn mztab() -> Self {
        Self {
            missing: &["null", "-"],
            double_missing: &["INF", "NaN"],
            nan_token_is_zero: false,
            double_sentinel: SentinelAction::Missing,
        }
    }

    /// Small-molecule section: integers have no sentinels; `INF`/`NaN`/`null`
    /// in doubles become a `-1.0` placeholder.
    pub fn small_molecule() -> Self {
        Self {
            missing: &[],
            double_missing: &["INF", "NaN", "null"],
            nan_token_is_zero: false,
            double_sentinel: SentinelAction::Substitute(-1.0),
        }
    }

    /// Feature/consensus text exports: no sentinels, but the literal `nan`
    /// is written by TextExporter for unset measurements and reads as zero.
    pub fn text_export() -> Self {
        Self {
            missing: &[],
            double_missing: &[],
            nan_token_is_zero: true,
            double_sentinel: SentinelAction::Missing,
        }
    }

    /// QC TSV dialects: every field must parse as declared.
    pub fn strict() -> Self {
        Self {
            missing: &[],
            double_missing: &[],
            nan_token_is_zero: false,
            double_sentinel: SentinelAction::Missing,
        }
    }

    fn is_sentinel(&self, raw: &str, datatype: ColumnType) -> bool {
        match datatype {
            ColumnType::String => false,
            ColumnType::Double => {
                self.missing.contains(&raw) || self.double_missing.contains(&raw)
            }
            _ => self.missing.contains(&raw),
        }
    }

    fn numeric_token<'a>(&self, raw: &'a str) -> &'a str {
        if self.nan_token_is_zero && raw == "nan" {
            "0"
        } else {
            raw
        }
    }
}

/// A field that failed to parse as its declared type. The line parser wraps
/// this with column and line context.
#[derive(Debug, Clone, PartialEq)]
pub struct CoerceError {
    pub raw: String,
    pub datatype: ColumnType,
}

fn truthy(raw: &str) -> bool {
    ["1", "yes", "true", "on"]
        .iter()
        .any(|token| raw.eq_ignore_ascii_case(token))
}

/// Converts one raw field into a [`Cell`] of the declared type.
///
/// Sentinel handling runs first; afterwards integers and doubles must parse,
/// booleans never fail (anything non-truthy is false), and double lists
/// split on `|` with every piece parsed as a double. String fields pass
/// through verbatim.
pub fn coerce(raw: &str, datatype: ColumnType, policy: &CoercePolicy) -> Result<Cell, CoerceError> {
    if policy.is_sentinel(raw, datatype) {
        let cell = match (datatype, policy.double_sentinel) {
            (ColumnType::Double, SentinelAction::Substitute(value)) => Cell::Double(value),
            _ => Cell::Missing(raw.to_string()),
        };
        return Ok(cell);
    }

    let fail = || CoerceError {
        raw: raw.to_string(),
        datatype,
    };

    match datatype {
        ColumnType::String => Ok(Cell::String(raw.to_string())),
        ColumnType::Integer => policy
            .numeric_token(raw)
            .parse::<i64>()
            .map(Cell::Integer)
            .map_err(|_| fail()),
        ColumnType::Double => policy
            .numeric_token(raw)
            .parse::<f64>()
            .map(Cell::Double)
            .map_err(|_| fail()),
        ColumnType::Boolean => Ok(Cell::Boolean(truthy(raw))),
        ColumnType::DoubleList => raw
            .split('|')
            .map(|piece| policy.numeric_token(piece).parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map(Cell::DoubleList)
            .map_err(|_| fail()),
    }
}
