use chrono::{DateTime, Utc};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building attempts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("round must be >= 1, got {0}")]
    InvalidRound(u32),
}

//
// ─── ATTEMPT RESULT ────────────────────────────────────────────────────────────
//

/// Binary outcome of a single answer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    /// The user answered the question correctly.
    Correct,
    /// The user answered the question incorrectly.
    Incorrect,
}

impl AttemptResult {
    /// Returns true for `Correct`.
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, AttemptResult::Correct)
    }
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// Record of one answer event for a question.
///
/// Stores the study round the answer was given in, its correctness, whether
/// the user has acknowledged the result, and when it happened. Attempts are
/// appended to a question's history and never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub round: u32,
    pub result: AttemptResult,
    pub result_confirmed: bool,
    pub answered_at: DateTime<Utc>,
}

impl Attempt {
    /// Creates an attempt with an unconfirmed result.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::InvalidRound` if `round` is zero.
    pub fn new(
        round: u32,
        result: AttemptResult,
        answered_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if round == 0 {
            return Err(AttemptError::InvalidRound(round));
        }
        Ok(Self {
            round,
            result,
            result_confirmed: false,
            answered_at,
        })
    }

    /// Returns true if this attempt was answered correctly.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.result.is_correct()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
