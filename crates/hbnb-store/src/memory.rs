use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::StorageBackend;

/// In-memory document holder.
///
/// Intended for tests and embedding. Counts writes so callers can assert that
/// an operation did or did not persist.
pub struct InMemoryBackend {
    document: RwLock<Option<String>>,
    writes: RwLock<usize>,
}

impl InMemoryBackend {
    /// Create an empty backend (reads as "never written").
    pub fn new() -> Self {
        Self {
            document: RwLock::new(None),
            writes: RwLock::new(0),
        }
    }

    /// Create a backend pre-seeded with a document.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
            writes: RwLock::new(0),
        }
    }

    /// The current document, if any.
    pub fn document(&self) -> Option<String> {
        self.document.read().expect("lock poisoned").clone()
    }

    /// Number of `write_snapshot` calls so far.
    pub fn write_count(&self) -> usize {
        *self.writes.read().expect("lock poisoned")
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_snapshot(&self) -> StoreResult<Option<String>> {
        Ok(self.document())
    }

    fn write_snapshot(&self, document: &str) -> StoreResult<()> {
        *self.document.write().expect("lock poisoned") = Some(document.to_string());
        *self.writes.write().expect("lock poisoned") += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".into()
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("write_count", &self.write_count())
            .finish()
    }
}
