//! Schema model and name-driven column type classification.
//!
//! This module owns [`Schema`] (the ordered column layout of one table),
//! [`ColumnType`] (the five cell types the readers produce), and the
//! [`TypeRules`] tables that map column names to types. Each format keeps its
//! own rule table: the general mzTab table and the small-molecule table
//! disagree on names like `retention_time` and `taxid`, and the
//! feature/consensus text format only distinguishes `charge_*` columns from
//! measurements. Rules never inspect row contents, only header names.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

// Requires at least one character before the literal, so a bare
// `search_engine_score[1]` stays a string column.
static ABUNDANCE: LazyLock<Regex> = LazyLock::new(|| Regex::new("^.+_abundance").unwrap());
static ENGINE_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^.+search_engine_score").unwrap());
static NUM_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new("^num_").unwrap());
static SM_ABUNDANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^smallmolecule_abundance(_stdev|_std_error)?_sub\[\d+\]$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Double,
    Boolean,
    DoubleList,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::DoubleList => "double-list",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub datatype: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: ColumnType) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

enum Matcher {
    Exact(&'static [&'static str]),
    Prefix(&'static str),
    Pattern {
        regex: &'static Regex,
        exclude_prefix: Option<&'static str>,
    },
}

impl Matcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Exact(names) => names.contains(&name),
            Matcher::Prefix(prefix) => name.starts_with(prefix),
            Matcher::Pattern {
                regex,
                exclude_prefix,
            } => {
                if exclude_prefix.is_some_and(|prefix| name.starts_with(prefix)) {
                    return false;
                }
                regex.is_match(name)
            }
        }
    }
}

struct TypeRule {
    matcher: Matcher,
    datatype: ColumnType,
}

/// Ordered first-match-wins classification table for one format.
pub struct TypeRules {
    rules: Vec<TypeRule>,
    fallback: ColumnType,
}

impl TypeRules {
    /// Rule table for the general mzTab sections (PRH/PEH/PSH/SMH).
    pub fn mztab() -> Self {
        Self {
            rules: vec![
                TypeRule {
                    matcher: Matcher::Exact(&[
                        "exp_mass_to_charge",
                        "calc_mass_to_charge",
                        "mass_to_charge",
                        "protein_coverage",
                    ]),
                    datatype: ColumnType::Double,
                },
                TypeRule {
                    matcher: Matcher::Pattern {
                        regex: &ABUNDANCE,
                        exclude_prefix: Some("opt_"),
                    },
                    datatype: ColumnType::Double,
                },
                TypeRule {
                    matcher: Matcher::Pattern {
                        regex: &ENGINE_SCORE,
                        exclude_prefix: Some("opt_"),
                    },
                    datatype: ColumnType::Double,
                },
                TypeRule {
                    matcher: Matcher::Exact(&["retention_time", "retention_time_window"]),
                    datatype: ColumnType::DoubleList,
                },
                TypeRule {
                    matcher: Matcher::Exact(&["charge", "taxid", "start", "end", "reliability"]),
                    datatype: ColumnType::Integer,
                },
                TypeRule {
                    matcher: Matcher::Pattern {
                        regex: &NUM_PREFIX,
                        exclude_prefix: None,
                    },
                    datatype: ColumnType::Integer,
                },
                TypeRule {
                    matcher: Matcher::Exact(&["unique"]),
                    datatype: ColumnType::Boolean,
                },
            ],
            fallback: ColumnType::String,
        }
    }

    /// Rule table owned by the small-molecule reader. Not unified with
    /// [`TypeRules::mztab`]: here `retention_time` is a plain double and
    /// `taxid`/`reliability` stay strings.
    pub fn small_molecule() -> Self {
        Self {
            rules: vec![
                TypeRule {
                    matcher: Matcher::Exact(&["mass_to_charge", "retention_time"]),
                    datatype: ColumnType::Double,
                },
                TypeRule {
                    matcher: Matcher::Exact(&["charge"]),
                    datatype: ColumnType::Integer,
                },
                TypeRule {
                    matcher: Matcher::Pattern {
                        regex: &SM_ABUNDANCE,
                        exclude_prefix: None,
                    },
                    datatype: ColumnType::Double,
                },
            ],
            fallback: ColumnType::String,
        }
    }

    /// Rule table for feature/consensus TextExporter headers: `charge_*`
    /// columns are integers, every other measurement is a double.
    pub fn text_export() -> Self {
        Self {
            rules: vec![TypeRule {
                matcher: Matcher::Prefix("charge_"),
                datatype: ColumnType::Integer,
            }],
            fallback: ColumnType::Double,
        }
    }

    /// Classifies a column name. Matching happens on the trimmed name; the
    /// caller keeps the original text as the column name.
    pub fn classify(&self, name: &str) -> ColumnType {
        let trimmed = name.trim();
        for rule in &self.rules {
            if rule.matcher.matches(trimmed) {
                return rule.datatype;
            }
        }
        self.fallback
    }
}

/// Splits a header line and classifies each field into a schema column.
///
/// Trailing empty tokens are dropped. With `strip_leading_tag` the first
/// token (a row-type tag such as `#CONSENSUS` or `SMH`) is discarded. Field
/// names are kept verbatim; a malformed header simply yields a short or
/// empty schema that row-width validation catches later.
pub fn schema_from_header(
    header_line: &str,
    separator: &str,
    strip_leading_tag: bool,
    rules: &TypeRules,
) -> Schema {
    let mut tokens: Vec<&str> = header_line.split(separator).collect();
    while tokens.last().is_some_and(|token| token.is_empty()) {
        tokens.pop();
    }
    let skip = usize::from(strip_leading_tag);
    let columns = tokens
        .into_iter()
        .skip(skip)
        .map(|token| Column::new(token, rules.classify(token)))
        .collect();
    Schema::new(columns)
}
