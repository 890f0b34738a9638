use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use doriloop_core::classify::Status;
use doriloop_core::model::{
    Attempt, AttemptResult, BookId, Chapter, QuestionAnswer, QuizBook, QuizBookDraft,
};
use doriloop_core::rate::{book_rate, chapter_rate, section_rate};
use doriloop_core::time::Clock;
use storage::repository::SnapshotStore;

use crate::error::ProgressError;

//
// ─── QUESTION REF ──────────────────────────────────────────────────────────────
//

/// Addresses one question by book id and the ordinal path down the tree.
///
/// `section_number` must be `Some` exactly when the book uses sections; a
/// mismatched addressing mode resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionRef {
    pub book_id: BookId,
    pub chapter_number: u32,
    pub section_number: Option<u32>,
    pub question_number: u32,
}

impl fmt::Display for QuestionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section_number {
            Some(section) => write!(
                f,
                "book {} chapter {} section {} question {}",
                self.book_id, self.chapter_number, section, self.question_number
            ),
            None => write!(
                f,
                "book {} chapter {} question {}",
                self.book_id, self.chapter_number, self.question_number
            ),
        }
    }
}

//
// ─── PROGRESS VIEWS ────────────────────────────────────────────────────────────
//

/// Per-question display state: classification plus history size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionProgress {
    pub number: u32,
    pub status: Status,
    pub attempt_count: usize,
}

/// Aggregated view of one section, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub number: u32,
    pub title: String,
    pub rate: u8,
    pub question_count: usize,
    pub questions: Vec<QuestionProgress>,
}

/// Aggregated view of one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterProgress {
    pub number: u32,
    pub title: String,
    pub rate: u8,
    pub question_count: usize,
    pub sections: Vec<SectionProgress>,
    /// Direct questions, present only when the book does not use sections.
    pub questions: Vec<QuestionProgress>,
}

/// Full snapshot of one book with every rate freshly computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookProgress {
    pub book: QuizBook,
    pub current_rate: u8,
    pub chapters: Vec<ChapterProgress>,
}

fn question_progress(question: &QuestionAnswer) -> QuestionProgress {
    QuestionProgress {
        number: question.number(),
        status: Status::of(question.attempts()),
        attempt_count: question.attempts().len(),
    }
}

fn book_progress(book: &QuizBook) -> BookProgress {
    let chapters = book
        .chapters()
        .iter()
        .map(|chapter| {
            let (sections, questions) = match chapter.content() {
                doriloop_core::model::ChapterContent::WithSections(sections) => (
                    sections
                        .iter()
                        .map(|section| SectionProgress {
                            number: section.number(),
                            title: section.title().to_owned(),
                            rate: section_rate(section),
                            question_count: section.question_count(),
                            questions: section.questions().iter().map(question_progress).collect(),
                        })
                        .collect(),
                    Vec::new(),
                ),
                doriloop_core::model::ChapterContent::WithoutSections(questions) => (
                    Vec::new(),
                    questions.iter().map(question_progress).collect(),
                ),
            };
            ChapterProgress {
                number: chapter.number(),
                title: chapter.title().to_owned(),
                rate: chapter_rate(chapter),
                question_count: chapter.question_count(),
                sections,
                questions,
            }
        })
        .collect();

    BookProgress {
        book: book.clone(),
        current_rate: book_rate(book),
        chapters,
    }
}

//
// ─── PARTIAL CHANGES ───────────────────────────────────────────────────────────
//

/// Partial update for a book. `category: Some(None)` clears the category;
/// replacing chapters re-runs the full structural validation.
#[derive(Debug, Clone, Default)]
pub struct QuizBookChanges {
    pub title: Option<String>,
    pub category: Option<Option<String>>,
    pub chapters: Option<Vec<Chapter>>,
}

//
// ─── PROGRESS STORE ────────────────────────────────────────────────────────────
//

/// Single in-memory source of truth for the quiz-book collection.
///
/// Constructed explicitly at the application's composition point and passed
/// to callers; there is no ambient global instance. All operations run to
/// completion before the next begins (single-threaded cooperative model),
/// so no internal locking is needed.
///
/// Mutators update memory synchronously, then write the full snapshot.
/// Lookup and validation failures leave memory untouched. A failed snapshot
/// write keeps the in-memory change, marks the store dirty, surfaces
/// `ProgressError::Persistence`, and is retried on the next mutation or
/// `flush`.
pub struct ProgressStore {
    clock: Clock,
    snapshots: Arc<dyn SnapshotStore>,
    books: HashMap<BookId, QuizBook>,
    next_id: u64,
    dirty: bool,
}

impl ProgressStore {
    /// Creates an empty store without touching the snapshot collaborator.
    #[must_use]
    pub fn new(clock: Clock, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self {
            clock,
            snapshots,
            books: HashMap::new(),
            next_id: 1,
            dirty: false,
        }
    }

    /// Loads the persisted collection into a fresh store. An absent
    /// document yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Persistence` if the snapshot cannot be read
    /// or fails schema validation.
    pub async fn load(
        clock: Clock,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Result<Self, ProgressError> {
        let loaded = snapshots.load().await?.unwrap_or_default();
        let next_id = loaded
            .iter()
            .map(|b| b.id().value())
            .max()
            .map_or(1, |max| max + 1);
        let books = loaded.into_iter().map(|b| (b.id(), b)).collect();
        Ok(Self {
            clock,
            snapshots,
            books,
            next_id,
            dirty: false,
        })
    }

    /// True when the latest snapshot write failed and a retry is pending.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Fetch one book with all rates computed from its attempt logs.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotFound` for an unknown id.
    pub fn get_quiz_book(&self, id: BookId) -> Result<BookProgress, ProgressError> {
        self.books
            .get(&id)
            .map(book_progress)
            .ok_or(ProgressError::NotFound(id))
    }

    /// All books ordered by id, with rates computed fresh.
    #[must_use]
    pub fn list_quiz_books(&self) -> Vec<BookProgress> {
        let mut books: Vec<&QuizBook> = self.books.values().collect();
        books.sort_by_key(|b| b.id());
        books.into_iter().map(book_progress).collect()
    }

    // ── Mutators ───────────────────────────────────────────────────────────

    /// Validates and registers a new quiz book, assigning its id and
    /// timestamps.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Validation` if the draft violates the
    /// structural invariants (nothing is inserted), or
    /// `ProgressError::Persistence` if the snapshot write fails (the book
    /// stays registered).
    pub async fn add_quiz_book(&mut self, draft: QuizBookDraft) -> Result<BookId, ProgressError> {
        let now = self.clock.now();
        let validated = draft
            .validate(now)
            .map_err(|e| ProgressError::Validation(e.into()))?;

        let id = BookId::new(self.next_id);
        self.next_id += 1;
        self.books.insert(id, validated.assign_id(id));
        debug!(book_id = %id, "registered quiz book");

        self.persist().await?;
        Ok(id)
    }

    /// Applies a partial update to a book.
    ///
    /// Changes are applied to a copy first, so a validation failure leaves
    /// the stored book untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotFound` for an unknown id,
    /// `ProgressError::Validation` for invariant violations, or
    /// `ProgressError::Persistence` if the snapshot write fails.
    pub async fn update_quiz_book(
        &mut self,
        id: BookId,
        changes: QuizBookChanges,
    ) -> Result<(), ProgressError> {
        let now = self.clock.now();
        let mut updated = self
            .books
            .get(&id)
            .ok_or(ProgressError::NotFound(id))?
            .clone();

        if let Some(title) = changes.title {
            updated
                .set_title(title, now)
                .map_err(|e| ProgressError::Validation(e.into()))?;
        }
        if let Some(category) = changes.category {
            updated.set_category(category, now);
        }
        if let Some(chapters) = changes.chapters {
            updated
                .replace_chapters(chapters, now)
                .map_err(|e| ProgressError::Validation(e.into()))?;
        }

        self.books.insert(id, updated);
        self.persist().await
    }

    /// Removes a book; the owned tree drops with it (chapters, sections,
    /// questions, attempts).
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotFound` for an unknown id, or
    /// `ProgressError::Persistence` if the snapshot write fails.
    pub async fn delete_quiz_book(&mut self, id: BookId) -> Result<(), ProgressError> {
        if self.books.remove(&id).is_none() {
            return Err(ProgressError::NotFound(id));
        }
        debug!(book_id = %id, "deleted quiz book");
        self.persist().await
    }

    /// Appends an answer event to the referenced question, with
    /// `answered_at` set from the store's clock and an unconfirmed result.
    ///
    /// Returns the question's new display classification.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::QuestionNotFound` if the reference does not
    /// resolve (store unchanged), `ProgressError::Validation` for an
    /// invalid round, or `ProgressError::Persistence` if the snapshot write
    /// fails (the attempt stays recorded).
    pub async fn record_attempt(
        &mut self,
        question_ref: QuestionRef,
        result: AttemptResult,
        round: u32,
    ) -> Result<Status, ProgressError> {
        let now = self.clock.now();
        let attempt =
            Attempt::new(round, result, now).map_err(|e| ProgressError::Validation(e.into()))?;

        let book = self
            .books
            .get_mut(&question_ref.book_id)
            .ok_or(ProgressError::QuestionNotFound(question_ref))?;
        let question = book
            .question_mut(
                question_ref.chapter_number,
                question_ref.section_number,
                question_ref.question_number,
            )
            .ok_or(ProgressError::QuestionNotFound(question_ref))?;

        question
            .record(attempt)
            .map_err(|e| ProgressError::Validation(e.into()))?;
        let status = Status::of(question.attempts());
        book.touch(now);

        self.persist().await?;
        Ok(status)
    }

    /// Replaces the free-text memo on a question; empty input clears it.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::QuestionNotFound` if the reference does not
    /// resolve, or `ProgressError::Persistence` if the snapshot write
    /// fails.
    pub async fn set_question_memo(
        &mut self,
        question_ref: QuestionRef,
        memo: Option<String>,
    ) -> Result<(), ProgressError> {
        let now = self.clock.now();
        let book = self
            .books
            .get_mut(&question_ref.book_id)
            .ok_or(ProgressError::QuestionNotFound(question_ref))?;
        let question = book
            .question_mut(
                question_ref.chapter_number,
                question_ref.section_number,
                question_ref.question_number,
            )
            .ok_or(ProgressError::QuestionNotFound(question_ref))?;

        question.set_memo(memo);
        book.touch(now);
        self.persist().await
    }

    /// Moves a book to its next study pass. Recorded attempts keep the
    /// round they were answered in; history is retained for trend analysis.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotFound` for an unknown id, or
    /// `ProgressError::Persistence` if the snapshot write fails.
    pub async fn advance_round(&mut self, id: BookId) -> Result<u32, ProgressError> {
        let now = self.clock.now();
        let book = self.books.get_mut(&id).ok_or(ProgressError::NotFound(id))?;
        book.advance_round(now);
        let round = book.current_round();
        self.persist().await?;
        Ok(round)
    }

    /// Retries a pending snapshot write, e.g. on app resume. No-op when the
    /// store is clean.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Persistence` if the write fails again.
    pub async fn flush(&mut self) -> Result<(), ProgressError> {
        if !self.dirty {
            return Ok(());
        }
        self.persist().await
    }

    /// Writes the full collection snapshot. Last-write-wins; the in-memory
    /// state is already current either way.
    async fn persist(&mut self) -> Result<(), ProgressError> {
        self.dirty = true;
        let mut books: Vec<QuizBook> = self.books.values().cloned().collect();
        books.sort_by_key(QuizBook::id);

        match self.snapshots.save(&books).await {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "snapshot write failed; will retry");
                Err(ProgressError::Persistence(e))
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
