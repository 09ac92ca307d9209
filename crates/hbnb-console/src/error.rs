use thiserror::Error;

use hbnb_store::StoreError;

/// Shell-style tokenization failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No closing quotation")]
    UnclosedQuote,

    #[error("No escaped character")]
    TrailingEscape,
}

/// Failures of the restricted literal parser.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub reason: String,
}

impl LiteralError {
    pub(crate) fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

/// User-input rejections. Each renders as the exact console diagnostic and
/// leaves the store untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    UnknownClass,

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    NoInstance,

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,
}

/// Failures that end a console session.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
