#![forbid(unsafe_code)]

pub mod classify;
pub mod error;
pub mod model;
pub mod rate;
pub mod time;

pub use classify::Status;
pub use error::Error;
pub use model::{
    Attempt, AttemptResult, BookId, Chapter, ChapterContent, ChapterId, QuestionAnswer,
    QuestionError, QuizBook, QuizBookDraft, QuizBookError, Section, SectionId, ValidatedBook,
};
pub use time::Clock;
