use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DsvError>;

#[derive(Error, Debug)]
/// Errors raised while configuring a parser or decoding rows.
pub enum DsvError {
    #[error("unsupported dsv type: {0}")]
    UnknownDelimiter(String),

    #[error("delimiter {0:?} is not a single-byte character")]
    InvalidDelimiter(char),

    #[error("missing header line")]
    MissingHeader,

    #[error("read error: {0}")]
    Read(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    Quote { line: u64, message: &'static str },

    #[error("column {column} ({field}): cannot parse {value:?} as {kind}: {reason}")]
    Coercion {
        column: usize,
        field: &'static str,
        value: String,
        kind: &'static str,
        reason: String,
    },

    #[error("unsupported field type: {type_name} (field {field})")]
    UnsupportedType {
        field: &'static str,
        type_name: &'static str,
    },

    #[error("field index {index} out of range for record with {len} fields")]
    FieldIndexOutOfRange { index: usize, len: usize },
}

impl DsvError {
    /// Returns `true` when the error was raised while converting a cell.
    pub fn is_coercion(&self) -> bool {
        matches!(self, DsvError::Coercion { .. })
    }
}
