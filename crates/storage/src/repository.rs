use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

use doriloop_core::model::QuizBook;

use crate::snapshot::CollectionDoc;

/// Errors surfaced by snapshot storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("snapshot failed validation: {0}")]
    Schema(String),
}

/// Contract for the persistence collaborator: one fixed key holding the
/// whole quiz-book collection as a single document.
///
/// Writes are full-document overwrites with last-write-wins semantics, so a
/// superseded write needs no cancellation. A missing document loads as
/// `None`, which callers treat as an empty collection.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the full collection, or `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` for read failures,
    /// `StorageError::Serialization` for malformed JSON, and
    /// `StorageError::Schema` if the document does not describe a valid
    /// collection.
    async fn load(&self) -> Result<Option<Vec<QuizBook>>, StorageError>;

    /// Overwrite the stored document with the given collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` or `StorageError::Serialization` if the
    /// write fails. The caller's in-memory state is not affected either way.
    async fn save(&self, books: &[QuizBook]) -> Result<(), StorageError>;
}

/// In-memory snapshot store for tests and prototyping.
///
/// Stores the serialized document (not the domain values) so tests exercise
/// the same encode/validate path as the file store. Write failures can be
/// injected to test the persistence-retry contract.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    doc: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored document, for assertions.
    #[must_use]
    pub fn raw_document(&self) -> Option<String> {
        self.doc.lock().map(|guard| guard.clone()).unwrap_or(None)
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load(&self) -> Result<Option<Vec<QuizBook>>, StorageError> {
        let guard = self
            .doc
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        let Some(raw) = guard.as_ref() else {
            return Ok(None);
        };
        let doc: CollectionDoc = serde_json::from_str(raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(doc.into_domain()?))
    }

    async fn save(&self, books: &[QuizBook]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("injected write failure".into()));
        }
        let doc = CollectionDoc::from_domain(books);
        let raw =
            serde_json::to_string(&doc).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut guard = self
            .doc
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(raw);
        Ok(())
    }
}
