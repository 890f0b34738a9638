use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::chapter::{Chapter, ChapterError};
use crate::model::ids::BookId;
use crate::model::question::QuestionAnswer;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building or mutating a quiz book.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizBookError {
    #[error("book title cannot be empty")]
    EmptyTitle,

    #[error("chapter numbers must be dense starting at 1 (expected {expected}, found {found})")]
    ChapterNumbersNotDense { expected: u32, found: u32 },

    #[error("current round must be >= 1")]
    InvalidRound,

    #[error("all chapters in a book must share one layout (sectioned or direct questions)")]
    MixedChapterLayout,

    #[error(transparent)]
    Chapter(#[from] ChapterError),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User input for a new quiz book, before validation.
///
/// Chapters arrive already built (their own constructors validate titles
/// and numbering within each chapter); the draft validates the book-level
/// structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizBookDraft {
    pub title: String,
    pub category: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl QuizBookDraft {
    /// Validates the draft into a book awaiting an id.
    ///
    /// # Errors
    ///
    /// Returns `QuizBookError::EmptyTitle` for a blank title or
    /// `QuizBookError::ChapterNumbersNotDense` if chapter numbers are not
    /// exactly 1..=n in order.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedBook, QuizBookError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(QuizBookError::EmptyTitle);
        }
        check_chapter_structure(&self.chapters)?;

        let category = self
            .category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        Ok(ValidatedBook {
            title,
            category,
            chapters: self.chapters,
            created_at: now,
        })
    }
}

/// A validated book structure that still needs a store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBook {
    title: String,
    category: Option<String>,
    chapters: Vec<Chapter>,
    created_at: DateTime<Utc>,
}

impl ValidatedBook {
    /// Binds the validated structure to an id, starting at round 1.
    #[must_use]
    pub fn assign_id(self, id: BookId) -> QuizBook {
        QuizBook {
            id,
            title: self.title,
            category: self.category,
            chapters: self.chapters,
            current_round: 1,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

//
// ─── QUIZ BOOK ─────────────────────────────────────────────────────────────────
//

/// A registered question set and its full answer history.
///
/// Owns the chapter/section/question tree. `current_round` is the active
/// study pass and never decreases; `updated_at` refreshes on every
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizBook {
    id: BookId,
    title: String,
    category: Option<String>,
    chapters: Vec<Chapter>,
    current_round: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuizBook {
    /// Rebuilds a book from persisted parts, re-running all structural
    /// validation.
    ///
    /// # Errors
    ///
    /// Returns `QuizBookError` if the title, round, or chapter numbering
    /// is invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: BookId,
        title: String,
        category: Option<String>,
        chapters: Vec<Chapter>,
        current_round: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, QuizBookError> {
        if title.trim().is_empty() {
            return Err(QuizBookError::EmptyTitle);
        }
        if current_round == 0 {
            return Err(QuizBookError::InvalidRound);
        }
        check_chapter_structure(&chapters)?;

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            category,
            chapters,
            current_round,
            created_at,
            updated_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Number of chapters; always the chapters sequence length, never a
    /// stored counter.
    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    #[must_use]
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.chapters.iter().map(Chapter::question_count).sum()
    }

    /// Whether this book's chapters subdivide into sections. Uniform across
    /// the book by construction; an empty book reads as direct questions.
    #[must_use]
    pub fn uses_sections(&self) -> bool {
        self.chapters.first().is_some_and(Chapter::uses_sections)
    }

    // Mutators. Every mutation refreshes `updated_at`.

    /// Renames the book.
    ///
    /// # Errors
    ///
    /// Returns `QuizBookError::EmptyTitle` for a blank title.
    pub fn set_title(
        &mut self,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), QuizBookError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizBookError::EmptyTitle);
        }
        self.title = title.trim().to_owned();
        self.updated_at = now;
        Ok(())
    }

    /// Replaces the category; empty input clears it.
    pub fn set_category(&mut self, category: Option<String>, now: DateTime<Utc>) {
        self.category = category
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());
        self.updated_at = now;
    }

    /// Swaps in a new chapter list, re-validating book-level numbering.
    ///
    /// # Errors
    ///
    /// Returns `QuizBookError::ChapterNumbersNotDense` if numbering is
    /// broken; the existing chapters are untouched on failure.
    pub fn replace_chapters(
        &mut self,
        chapters: Vec<Chapter>,
        now: DateTime<Utc>,
    ) -> Result<(), QuizBookError> {
        check_chapter_structure(&chapters)?;
        self.chapters = chapters;
        self.updated_at = now;
        Ok(())
    }

    /// Moves the book to the next study pass. Existing attempts keep the
    /// round they were answered in.
    pub fn advance_round(&mut self, now: DateTime<Utc>) {
        self.current_round += 1;
        self.updated_at = now;
    }

    /// Looks up a question through the chapter (and optional section)
    /// numbering.
    pub fn question_mut(
        &mut self,
        chapter_number: u32,
        section_number: Option<u32>,
        question_number: u32,
    ) -> Option<&mut QuestionAnswer> {
        self.chapters
            .iter_mut()
            .find(|c| c.number() == chapter_number)?
            .question_mut(section_number, question_number)
    }

    /// Refreshes `updated_at` after a nested mutation (e.g. recording an
    /// attempt through `question_mut`).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

fn check_chapter_structure(chapters: &[Chapter]) -> Result<(), QuizBookError> {
    for (index, chapter) in chapters.iter().enumerate() {
        let expected = u32::try_from(index + 1).unwrap_or(u32::MAX);
        if chapter.number() != expected {
            return Err(QuizBookError::ChapterNumbersNotDense {
                expected,
                found: chapter.number(),
            });
        }
    }
    if let Some(first) = chapters.first()
        && chapters.iter().any(|c| c.uses_sections() != first.uses_sections())
    {
        return Err(QuizBookError::MixedChapterLayout);
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::chapter::ChapterContent;
    use crate::model::ids::ChapterId;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn chapter(number: u32) -> Chapter {
        Chapter::new(
            ChapterId::new(u64::from(number)),
            format!("Chapter {number}"),
            number,
            ChapterContent::WithoutSections(vec![]),
        )
        .unwrap()
    }

    fn draft(chapters: Vec<Chapter>) -> QuizBookDraft {
        QuizBookDraft {
            title: "Civil Law".into(),
            category: Some("law".into()),
            chapters,
        }
    }

    #[test]
    fn draft_rejects_blank_title() {
        let err = QuizBookDraft {
            title: "  ".into(),
            category: None,
            chapters: vec![],
        }
        .validate(fixed_now())
        .unwrap_err();
        assert_eq!(err, QuizBookError::EmptyTitle);
    }

    #[test]
    fn draft_rejects_sparse_chapter_numbers() {
        let err = draft(vec![chapter(1), chapter(3)])
            .validate(fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            QuizBookError::ChapterNumbersNotDense {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn validated_draft_starts_at_round_one() {
        let book = draft(vec![chapter(1), chapter(2)])
            .validate(fixed_now())
            .unwrap()
            .assign_id(BookId::new(7));

        assert_eq!(book.id(), BookId::new(7));
        assert_eq!(book.title(), "Civil Law");
        assert_eq!(book.category(), Some("law"));
        assert_eq!(book.chapter_count(), 2);
        assert_eq!(book.current_round(), 1);
        assert_eq!(book.created_at(), fixed_now());
        assert_eq!(book.updated_at(), fixed_now());
    }

    #[test]
    fn advance_round_increments_and_touches() {
        let mut book = draft(vec![chapter(1)])
            .validate(fixed_now())
            .unwrap()
            .assign_id(BookId::new(1));

        let later = fixed_now() + Duration::hours(1);
        book.advance_round(later);
        assert_eq!(book.current_round(), 2);
        assert_eq!(book.updated_at(), later);
    }

    #[test]
    fn replace_chapters_keeps_old_tree_on_failure() {
        let mut book = draft(vec![chapter(1), chapter(2)])
            .validate(fixed_now())
            .unwrap()
            .assign_id(BookId::new(1));

        let err = book
            .replace_chapters(vec![chapter(2)], fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            QuizBookError::ChapterNumbersNotDense { .. }
        ));
        assert_eq!(book.chapter_count(), 2);
    }

    #[test]
    fn draft_rejects_mixed_chapter_layouts() {
        let sectioned = Chapter::new(
            ChapterId::new(9),
            "Sectioned",
            2,
            ChapterContent::WithSections(vec![]),
        )
        .unwrap();
        let err = draft(vec![chapter(1), sectioned])
            .validate(fixed_now())
            .unwrap_err();
        assert_eq!(err, QuizBookError::MixedChapterLayout);
    }

    #[test]
    fn from_persisted_rejects_round_zero() {
        let err = QuizBook::from_persisted(
            BookId::new(1),
            "Book".into(),
            None,
            vec![],
            0,
            fixed_now(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, QuizBookError::InvalidRound);
    }

    #[test]
    fn set_title_trims_and_touches() {
        let mut book = draft(vec![])
            .validate(fixed_now())
            .unwrap()
            .assign_id(BookId::new(1));
        let later = fixed_now() + Duration::minutes(5);
        book.set_title("  Penal Code  ", later).unwrap();
        assert_eq!(book.title(), "Penal Code");
        assert_eq!(book.updated_at(), later);
    }
}
