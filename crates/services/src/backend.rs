//! Client for the remote backend's display-only endpoints.
//!
//! The backend feeds profile and study-history views; it has no authority
//! over quiz-book data, which lives in the local `ProgressStore`.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// The signed-in user's profile, including their stated study goal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub nickname: String,
    #[serde(default)]
    pub goal: Option<String>,
}

/// One day's study activity, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudyRecord {
    pub book_title: String,
    pub answered: u32,
    pub correct: u32,
    pub studied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct GoalUpdate<'a> {
    goal: &'a str,
}

/// Thin HTTP client over the backend API.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    /// Fetch the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::HttpStatus` for non-success responses and
    /// `BackendError::Http` for transport failures.
    pub async fn fetch_profile(&self) -> Result<UserProfile, BackendError> {
        let response = self.client.get(self.url("user/profile")).send().await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    /// Update the user's stated goal.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::HttpStatus` for non-success responses and
    /// `BackendError::Http` for transport failures.
    pub async fn update_goal(&self, goal: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url("user/goal"))
            .json(&GoalUpdate { goal })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }
        Ok(())
    }

    /// Fetch the most recent study records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::HttpStatus` for non-success responses and
    /// `BackendError::Http` for transport failures.
    pub async fn recent_study_records(&self, limit: u32) -> Result<Vec<StudyRecord>, BackendError> {
        let response = self
            .client
            .get(self.url("study-records"))
            .query(&[("limit", limit)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BackendError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}
