#![forbid(unsafe_code)]

pub mod json_file;
pub mod repository;
pub mod snapshot;

pub use json_file::JsonFileStore;
pub use repository::{InMemoryStore, SnapshotStore, StorageError};
pub use snapshot::CollectionDoc;
