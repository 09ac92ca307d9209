use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp {0:?}: expected YYYY-MM-DDTHH:MM:SS.ffffff")]
    InvalidTimestamp(String),

    #[error("unknown class: {0}")]
    UnknownClass(String),

    #[error("attribute {0} is reserved")]
    ReservedAttribute(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
