//! Shared error types for the services crate.

use thiserror::Error;

use doriloop_core::model::{AttemptError, BookId, ChapterError, QuestionError, QuizBookError};
use storage::repository::StorageError;

use crate::progress_store::QuestionRef;

/// Structural invariant violations, wrapping the core model errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(transparent)]
    Book(#[from] QuizBookError),
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}

/// Errors emitted by `ProgressStore`.
///
/// Lookup and validation failures leave the in-memory collection unchanged.
/// `Persistence` is different: the mutation has already been applied and
/// stays visible; only the durable snapshot write failed and will be
/// retried on the next mutation or `flush`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("no quiz book with id {0}")]
    NotFound(BookId),

    #[error("no question matching {0}")]
    QuestionNotFound(QuestionRef),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] StorageError),
}

/// Errors emitted by `BackendClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    #[error("backend request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `BookLookup`.
///
/// "Not found" is not represented here: an unknown ISBN is a normal
/// `Ok(None)` outcome.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    #[error("lookup request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
