use crate::error::StoreResult;

/// Durable home of the serialized registry.
///
/// Backends move whole documents; they never interpret them. Implementations
/// must satisfy:
/// - `read_snapshot` returns `Ok(None)` when nothing has been written yet.
/// - `write_snapshot` replaces the previous document entirely.
/// - All I/O errors are propagated, never silently ignored.
pub trait StorageBackend: Send + Sync {
    /// Read the current document, if any.
    fn read_snapshot(&self) -> StoreResult<Option<String>>;

    /// Replace the stored document.
    fn write_snapshot(&self, document: &str) -> StoreResult<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn read_snapshot(&self) -> StoreResult<Option<String>> {
        (**self).read_snapshot()
    }

    fn write_snapshot(&self, document: &str) -> StoreResult<()> {
        (**self).write_snapshot(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
