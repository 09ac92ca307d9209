use hbnb_types::TypeError;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not valid JSON or cannot be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record is not an object or lacks its `__class__` discriminator.
    #[error("malformed record {key}: {reason}")]
    MalformedRecord { key: String, reason: String },

    /// A record names a class the registry cannot resolve.
    #[error("unknown class {class:?} in record {key}")]
    UnknownClass { key: String, class: String },

    /// A record's attributes could not be restored.
    #[error("invalid record {key}: {source}")]
    InvalidRecord {
        key: String,
        #[source]
        source: TypeError,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
