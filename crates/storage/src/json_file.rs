//! File-backed snapshot store: one path, one JSON document.
//!
//! The path plays the role of the key-value store's fixed key. Writes go to
//! a sibling temp file and rename over the target, so readers never observe
//! a half-written document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use doriloop_core::model::QuizBook;

use crate::repository::{SnapshotStore, StorageError};
use crate::snapshot::CollectionDoc;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_owned();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Option<Vec<QuizBook>>, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        let doc: CollectionDoc = serde_json::from_slice(&raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let books = doc.into_domain()?;
        debug!(path = %self.path.display(), books = books.len(), "loaded snapshot");
        Ok(Some(books))
    }

    async fn save(&self, books: &[QuizBook]) -> Result<(), StorageError> {
        let doc = CollectionDoc::from_domain(books);
        let raw = serde_json::to_vec_pretty(&doc)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &raw)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        debug!(path = %self.path.display(), books = books.len(), "saved snapshot");
        Ok(())
    }
}
