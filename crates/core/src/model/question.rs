use thiserror::Error;

use crate::model::attempt::Attempt;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building or mutating a question's history.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question number must be >= 1")]
    InvalidNumber,

    #[error("attempt for question {number} is earlier than the previous attempt")]
    AttemptOutOfOrder { number: u32 },
}

//
// ─── QUESTION ANSWER ───────────────────────────────────────────────────────────
//

/// One question and its chronological answer history.
///
/// `number` identifies the question within its parent chapter or section.
/// Attempts are append-only and non-decreasing in `answered_at`; both
/// constructors and `record` uphold that invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAnswer {
    number: u32,
    memo: Option<String>,
    attempts: Vec<Attempt>,
}

impl QuestionAnswer {
    /// Creates a question with no answer history.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidNumber` if `number` is zero.
    pub fn new(number: u32, memo: Option<String>) -> Result<Self, QuestionError> {
        if number == 0 {
            return Err(QuestionError::InvalidNumber);
        }
        let memo = memo.map(|m| m.trim().to_owned()).filter(|m| !m.is_empty());
        Ok(Self {
            number,
            memo,
            attempts: Vec::new(),
        })
    }

    /// Rebuilds a question from persisted parts, re-checking ordering.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidNumber` for a zero number, or
    /// `QuestionError::AttemptOutOfOrder` if the history is not
    /// chronological.
    pub fn from_parts(
        number: u32,
        memo: Option<String>,
        attempts: Vec<Attempt>,
    ) -> Result<Self, QuestionError> {
        let mut question = Self::new(number, memo)?;
        for attempt in attempts {
            question.record(attempt)?;
        }
        Ok(question)
    }

    /// Appends a new attempt to the history.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::AttemptOutOfOrder` if the attempt is dated
    /// before the latest recorded one.
    pub fn record(&mut self, attempt: Attempt) -> Result<(), QuestionError> {
        if let Some(last) = self.attempts.last()
            && attempt.answered_at < last.answered_at
        {
            return Err(QuestionError::AttemptOutOfOrder {
                number: self.number,
            });
        }
        self.attempts.push(attempt);
        Ok(())
    }

    /// Replaces the memo; empty or whitespace-only input clears it.
    pub fn set_memo(&mut self, memo: Option<String>) {
        self.memo = memo.map(|m| m.trim().to_owned()).filter(|m| !m.is_empty());
    }

    // Accessors
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Most recent attempt, if any.
    #[must_use]
    pub fn latest_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// Returns true if the question has been answered and the latest
    /// attempt was correct. This is the basis for rate aggregation.
    #[must_use]
    pub fn latest_is_correct(&self) -> bool {
        self.latest_attempt().is_some_and(Attempt::is_correct)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
