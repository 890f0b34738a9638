//! Display status classification over a question's attempt history.
//!
//! The status is a read-only view derived from the attempt log on every
//! read; it is never stored, so it cannot drift from the history.

use crate::model::Attempt;

/// Recency-weighted mastery indicator for one question.
///
/// Checks are evaluated gold → silver → green → red; first match wins.
/// "Last N attempts" requires at least N attempts in the full history, so a
/// two-attempt history can never be `Gold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Last three attempts all correct.
    Gold,
    /// Last two attempts correct (but not three).
    Silver,
    /// Latest attempt correct (but not the one before).
    Green,
    /// Latest attempt incorrect.
    Red,
    /// Never answered.
    Gray,
}

impl Status {
    /// Classifies an attempt history.
    ///
    /// Pure and total: any slice maps to exactly one status.
    #[must_use]
    pub fn of(attempts: &[Attempt]) -> Self {
        let Some(last) = attempts.last() else {
            return Status::Gray;
        };

        if trailing_correct(attempts, 3) {
            Status::Gold
        } else if trailing_correct(attempts, 2) {
            Status::Silver
        } else if last.is_correct() {
            Status::Green
        } else {
            Status::Red
        }
    }

    /// Stable lowercase name, for logs and display layers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Gold => "gold",
            Status::Silver => "silver",
            Status::Green => "green",
            Status::Red => "red",
            Status::Gray => "gray",
        }
    }
}

/// True when the history has at least `n` attempts and the last `n` are all
/// correct.
fn trailing_correct(attempts: &[Attempt], n: usize) -> bool {
    attempts.len() >= n && attempts[attempts.len() - n..].iter().all(Attempt::is_correct)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttemptResult;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn history(results: &[AttemptResult]) -> Vec<Attempt> {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                Attempt::new(
                    1,
                    *result,
                    fixed_now() + Duration::seconds(i64::try_from(i).unwrap()),
                )
                .unwrap()
            })
            .collect()
    }

    use AttemptResult::{Correct as O, Incorrect as X};

    #[test]
    fn empty_history_is_gray() {
        assert_eq!(Status::of(&[]), Status::Gray);
    }

    #[test]
    fn three_trailing_correct_is_gold() {
        assert_eq!(Status::of(&history(&[O, O, O])), Status::Gold);
        assert_eq!(Status::of(&history(&[X, O, O, O])), Status::Gold);
        assert_eq!(Status::of(&history(&[X, X, X, O, O, O])), Status::Gold);
    }

    #[test]
    fn incorrect_then_two_correct_is_silver() {
        // [×, ○, ○]: only two trailing ○, so gold fails and silver matches.
        assert_eq!(Status::of(&history(&[X, O, O])), Status::Silver);
    }

    #[test]
    fn exactly_two_correct_is_silver_never_gold() {
        assert_eq!(Status::of(&history(&[O, O])), Status::Silver);
    }

    #[test]
    fn single_correct_is_green() {
        assert_eq!(Status::of(&history(&[O])), Status::Green);
        assert_eq!(Status::of(&history(&[X, O])), Status::Green);
        assert_eq!(Status::of(&history(&[O, X, O])), Status::Green);
    }

    #[test]
    fn latest_incorrect_is_red() {
        assert_eq!(Status::of(&history(&[X])), Status::Red);
        assert_eq!(Status::of(&history(&[O, O, O, X])), Status::Red);
    }

    #[test]
    fn status_names_are_stable() {
        assert_eq!(Status::Gold.as_str(), "gold");
        assert_eq!(Status::Gray.as_str(), "gray");
    }
}
