//! Entity storage for the HBnB console.
//!
//! The [`ObjectStore`] is the sole authority over live entities: it keeps the
//! in-memory registry keyed by `<ClassName>.<id>` and flushes it, whole, to a
//! [`StorageBackend`] after every mutation.
//!
//! # Storage Backends
//!
//! - [`JsonFileBackend`] -- a single JSON document at a fixed path
//! - [`InMemoryBackend`] -- a string buffer for tests and embedding
//!
//! # Design Rules
//!
//! 1. Registry iteration follows insertion order.
//! 2. Persistence is truncate-and-rewrite; there is no write-behind buffering.
//! 3. A missing backing file loads as an empty store.
//! 4. Malformed documents and unknown `__class__` names are fatal, never skipped.
//! 5. Fresh construction is the only registering path; reload registers once.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use file::JsonFileBackend;
pub use memory::InMemoryBackend;
pub use store::ObjectStore;
pub use traits::StorageBackend;
