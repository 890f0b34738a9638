//! Snapshot document schema for the persisted quiz-book collection.
//!
//! The document types mirror the domain tree but stay independent of it, so
//! the wire shape can hold still while the domain moves. `into_domain` is
//! the single validation gate: untyped JSON never becomes domain state
//! without passing through the core constructors.
//!
//! Timestamps serialize as RFC 3339 strings and are truncated to whole
//! seconds on write, which makes the round-trip lossless to the second.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use doriloop_core::model::{
    Attempt, AttemptResult, BookId, Chapter, ChapterContent, ChapterId, QuestionAnswer, QuizBook,
    Section, SectionId,
};

use crate::repository::StorageError;

/// Version written into every snapshot; bumped on breaking schema changes.
pub const SNAPSHOT_VERSION: u32 = 1;

//
// ─── DOCUMENT TYPES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDoc {
    pub version: u32,
    pub books: Vec<BookDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDoc {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub uses_sections: bool,
    pub chapters: Vec<ChapterDoc>,
    pub current_round: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chapter on the wire keeps the legacy two-optional-fields shape; the
/// domain's tagged variant is reconstructed (and the shape checked) in
/// `into_domain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDoc {
    pub id: u64,
    pub title: String,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionDoc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionDoc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDoc {
    pub id: u64,
    pub title: String,
    pub number: u32,
    pub questions: Vec<QuestionDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDoc {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub attempts: Vec<AttemptDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptDoc {
    pub round: u32,
    pub result: AttemptResultDoc,
    pub result_confirmed: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResultDoc {
    Correct,
    Incorrect,
}

//
// ─── DOMAIN → DOCUMENT ─────────────────────────────────────────────────────────
//

impl CollectionDoc {
    /// Builds the snapshot document for the given collection.
    #[must_use]
    pub fn from_domain(books: &[QuizBook]) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            books: books.iter().map(BookDoc::from_book).collect(),
        }
    }

    /// Validates the document into domain books.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Schema` for an unsupported version, a chapter
    /// whose populated fields contradict the book's `uses_sections` flag,
    /// or any structural violation the core constructors reject.
    pub fn into_domain(self) -> Result<Vec<QuizBook>, StorageError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(StorageError::Schema(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        self.books.into_iter().map(BookDoc::into_book).collect()
    }
}

impl BookDoc {
    fn from_book(book: &QuizBook) -> Self {
        Self {
            id: book.id().value(),
            title: book.title().to_owned(),
            category: book.category().map(str::to_owned),
            uses_sections: book.uses_sections(),
            chapters: book.chapters().iter().map(ChapterDoc::from_chapter).collect(),
            current_round: book.current_round(),
            created_at: whole_seconds(book.created_at()),
            updated_at: whole_seconds(book.updated_at()),
        }
    }

    fn into_book(self) -> Result<QuizBook, StorageError> {
        let chapters = self
            .chapters
            .into_iter()
            .map(|c| c.into_chapter(self.uses_sections))
            .collect::<Result<Vec<_>, _>>()?;

        QuizBook::from_persisted(
            BookId::new(self.id),
            self.title,
            self.category,
            chapters,
            self.current_round,
            self.created_at,
            self.updated_at,
        )
        .map_err(|e| StorageError::Schema(e.to_string()))
    }
}

impl ChapterDoc {
    fn from_chapter(chapter: &Chapter) -> Self {
        let (sections, questions) = match chapter.content() {
            ChapterContent::WithSections(sections) => (
                Some(sections.iter().map(SectionDoc::from_section).collect()),
                None,
            ),
            ChapterContent::WithoutSections(questions) => (
                None,
                Some(questions.iter().map(QuestionDoc::from_question).collect()),
            ),
        };
        Self {
            id: chapter.id().value(),
            title: chapter.title().to_owned(),
            number: chapter.number(),
            sections,
            questions,
        }
    }

    fn into_chapter(self, uses_sections: bool) -> Result<Chapter, StorageError> {
        let content = match (uses_sections, self.sections, self.questions) {
            (true, Some(sections), None) => ChapterContent::WithSections(
                sections
                    .into_iter()
                    .map(SectionDoc::into_section)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (false, None, Some(questions)) => ChapterContent::WithoutSections(
                questions
                    .into_iter()
                    .map(QuestionDoc::into_question)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => {
                return Err(StorageError::Schema(format!(
                    "chapter {} does not match the book's uses_sections={uses_sections} layout",
                    self.number
                )));
            }
        };

        Chapter::new(ChapterId::new(self.id), self.title, self.number, content)
            .map_err(|e| StorageError::Schema(e.to_string()))
    }
}

impl SectionDoc {
    fn from_section(section: &Section) -> Self {
        Self {
            id: section.id().value(),
            title: section.title().to_owned(),
            number: section.number(),
            questions: section
                .questions()
                .iter()
                .map(QuestionDoc::from_question)
                .collect(),
        }
    }

    fn into_section(self) -> Result<Section, StorageError> {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionDoc::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        Section::new(SectionId::new(self.id), self.title, self.number, questions)
            .map_err(|e| StorageError::Schema(e.to_string()))
    }
}

impl QuestionDoc {
    fn from_question(question: &QuestionAnswer) -> Self {
        Self {
            number: question.number(),
            memo: question.memo().map(str::to_owned),
            attempts: question.attempts().iter().map(AttemptDoc::from_attempt).collect(),
        }
    }

    fn into_question(self) -> Result<QuestionAnswer, StorageError> {
        let attempts = self
            .attempts
            .into_iter()
            .map(AttemptDoc::into_attempt)
            .collect::<Result<Vec<_>, _>>()?;
        QuestionAnswer::from_parts(self.number, self.memo, attempts)
            .map_err(|e| StorageError::Schema(e.to_string()))
    }
}

impl AttemptDoc {
    fn from_attempt(attempt: &Attempt) -> Self {
        Self {
            round: attempt.round,
            result: match attempt.result {
                AttemptResult::Correct => AttemptResultDoc::Correct,
                AttemptResult::Incorrect => AttemptResultDoc::Incorrect,
            },
            result_confirmed: attempt.result_confirmed,
            answered_at: whole_seconds(attempt.answered_at),
        }
    }

    fn into_attempt(self) -> Result<Attempt, StorageError> {
        let result = match self.result {
            AttemptResultDoc::Correct => AttemptResult::Correct,
            AttemptResultDoc::Incorrect => AttemptResult::Incorrect,
        };
        let mut attempt = Attempt::new(self.round, result, self.answered_at)
            .map_err(|e| StorageError::Schema(e.to_string()))?;
        attempt.result_confirmed = self.result_confirmed;
        Ok(attempt)
    }
}

fn whole_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_nanosecond(0).unwrap_or(t)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use doriloop_core::model::QuizBookDraft;
    use doriloop_core::time::fixed_now;
    use chrono::Duration;

    fn sample_book() -> QuizBook {
        let mut q1 = QuestionAnswer::new(1, Some("definitions".into())).unwrap();
        q1.record(Attempt::new(1, AttemptResult::Incorrect, fixed_now()).unwrap())
            .unwrap();
        q1.record(
            Attempt::new(
                2,
                AttemptResult::Correct,
                fixed_now() + Duration::days(3),
            )
            .unwrap(),
        )
        .unwrap();
        let q2 = QuestionAnswer::new(2, None).unwrap();

        let section = Section::new(SectionId::new(1), "Overview", 1, vec![q1, q2]).unwrap();
        let chapter = Chapter::new(
            ChapterId::new(1),
            "Intro",
            1,
            ChapterContent::WithSections(vec![section]),
        )
        .unwrap();

        QuizBookDraft {
            title: "Contract Law".into(),
            category: Some("law".into()),
            chapters: vec![chapter],
        }
        .validate(fixed_now())
        .unwrap()
        .assign_id(BookId::new(5))
    }

    #[test]
    fn snapshot_roundtrip_preserves_collection() {
        let books = vec![sample_book()];
        let doc = CollectionDoc::from_domain(&books);
        let raw = serde_json::to_string(&doc).unwrap();
        let parsed: CollectionDoc = serde_json::from_str(&raw).unwrap();
        let restored = parsed.into_domain().unwrap();
        assert_eq!(restored, books);
    }

    #[test]
    fn roundtrip_preserves_attempt_fields_to_the_second() {
        let books = vec![sample_book()];
        let doc = CollectionDoc::from_domain(&books);
        let restored = doc.into_domain().unwrap();

        let chapter = &restored[0].chapters()[0];
        let question = chapter.content().questions().next().unwrap();
        let attempts = question.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].round, 1);
        assert!(!attempts[0].is_correct());
        assert_eq!(attempts[1].round, 2);
        assert_eq!(attempts[1].answered_at, fixed_now() + Duration::days(3));
    }

    #[test]
    fn rejects_unknown_version() {
        let doc = CollectionDoc {
            version: 99,
            books: vec![],
        };
        let err = doc.into_domain().unwrap_err();
        assert!(matches!(err, StorageError::Schema(_)));
    }

    #[test]
    fn rejects_chapter_contradicting_layout_flag() {
        let mut doc = CollectionDoc::from_domain(&[sample_book()]);
        // Claim direct questions while the chapter carries sections.
        doc.books[0].uses_sections = false;
        let err = doc.into_domain().unwrap_err();
        assert!(matches!(err, StorageError::Schema(_)));
    }

    #[test]
    fn rejects_chapter_with_both_collections() {
        let mut doc = CollectionDoc::from_domain(&[sample_book()]);
        doc.books[0].chapters[0].questions = Some(vec![]);
        let err = doc.into_domain().unwrap_err();
        assert!(matches!(err, StorageError::Schema(_)));
    }

    #[test]
    fn rejects_disordered_attempt_history() {
        let mut doc = CollectionDoc::from_domain(&[sample_book()]);
        let attempts = &mut doc.books[0].chapters[0].sections.as_mut().unwrap()[0].questions[0]
            .attempts;
        attempts.swap(0, 1);
        let err = doc.into_domain().unwrap_err();
        assert!(matches!(err, StorageError::Schema(_)));
    }

    #[test]
    fn answered_at_truncates_to_whole_seconds() {
        let t = fixed_now() + Duration::milliseconds(1500);
        let attempt = Attempt::new(1, AttemptResult::Correct, t).unwrap();
        let doc = AttemptDoc::from_attempt(&attempt);
        assert_eq!(doc.answered_at, fixed_now() + Duration::seconds(1));
    }
}
