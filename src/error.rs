use crate::schema::ColumnType;

/// Errors raised while turning an export file into typed tables.
///
/// Every variant is fatal for the file being read except [`ReadError::Canceled`],
/// which reports a cooperative abort requested by the caller.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// No input path was given where exactly one is required
    #[error("No input file was supplied")]
    MissingInput,

    /// More than one input path was given where exactly one is required
    #[error("Expected exactly one input file but got {0}")]
    MultipleInputs(usize),

    /// Header-level failure that is not a width or name mismatch
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Header has the wrong number of columns
    #[error("Invalid file header: expected {expected} columns but got {actual}")]
    HeaderWidth { expected: usize, actual: usize },

    /// Header token differs from the expected column name
    #[error("Invalid header element: expected '{expected}' but got '{actual}'")]
    HeaderName { expected: String, actual: String },

    /// Data line token count does not fit the schema
    #[error("Line {line}: expected {expected} field(s) but got {actual} in: {content}")]
    LineWidth {
        line: u64,
        expected: usize,
        actual: usize,
        content: String,
    },

    /// A field's text cannot be parsed as its column's declared type
    #[error("Line {line}: cannot parse '{raw}' as {datatype} for column '{column}'")]
    Coercion {
        line: u64,
        column: String,
        datatype: ColumnType,
        raw: String,
    },

    /// Section data arrived before the section's header
    #[error("Line {line}: found {data_tag} before {header_tag}")]
    SectionOrder {
        line: u64,
        data_tag: &'static str,
        header_tag: &'static str,
    },

    /// Non-empty line too short to carry a section identifier
    #[error("Line {line}: found non-empty line without an identifier: {content}")]
    MalformedLine { line: u64, content: String },

    /// Peptide detail line length matches none of the known layouts
    #[error(
        "Line {line}: peptide line with {actual} field(s) matches no known layout; \
         do not use 'no_ids' in TextExporter"
    )]
    UnknownDetailLayout { line: u64, actual: usize },

    /// Cooperative cancellation; not a parse failure
    #[error("Read was canceled")]
    Canceled,

    /// Underlying I/O failure
    #[error("I/O error while reading input: {0}")]
    Io(#[from] std::io::Error),
}
