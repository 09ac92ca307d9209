use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreResult;
use crate::traits::StorageBackend;

/// Default storage file, relative to the working directory.
pub const DEFAULT_STORAGE_PATH: &str = "file.json";

/// A single JSON document at a fixed path.
///
/// Writes truncate and rewrite the file in place. There is no temp-file
/// rename, so a crash mid-write can leave a partial document.
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileBackend {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_PATH)
    }
}

impl StorageBackend for JsonFileBackend {
    fn read_snapshot(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "storage file absent");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_snapshot(&self, document: &str) -> StoreResult<()> {
        fs::write(&self.path, document)?;
        debug!(path = %self.path.display(), bytes = document.len(), "storage file written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
