//! ISBN book-metadata lookup, used to pre-fill a new quiz book's title.
//!
//! Lookup never mutates progress data; an unknown ISBN is a normal outcome,
//! surfaced as `Ok(None)`.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use doriloop_core::model::QuizBookDraft;

use crate::error::LookupError;

/// Metadata returned for a known ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookMetadata {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Thin HTTP client over the book-metadata lookup API.
#[derive(Clone)]
pub struct BookLookup {
    client: Client,
    base_url: String,
}

impl BookLookup {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Look up a book by ISBN.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::HttpStatus` for non-success responses other
    /// than 404 (which is `Ok(None)`) and `LookupError::Http` for
    /// transport failures.
    pub async fn lookup(&self, isbn: &str) -> Result<Option<BookMetadata>, LookupError> {
        let url = format!("{}/books/{isbn}", self.base_url.trim_end_matches('/'));
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(isbn, "no metadata for isbn");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LookupError::HttpStatus(response.status()));
        }
        Ok(Some(response.json().await?))
    }

    /// Look up an ISBN and turn the result into a chapterless draft with
    /// the title pre-filled. The user adds structure before registering.
    ///
    /// # Errors
    ///
    /// Same as [`lookup`](Self::lookup).
    pub async fn prefill_draft(&self, isbn: &str) -> Result<Option<QuizBookDraft>, LookupError> {
        Ok(self.lookup(isbn).await?.map(|metadata| QuizBookDraft {
            title: metadata.title,
            category: None,
            chapters: Vec::new(),
        }))
    }
}
