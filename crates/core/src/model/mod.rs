mod attempt;
mod book;
mod chapter;
mod ids;
mod question;

pub use attempt::{Attempt, AttemptError, AttemptResult};
pub use book::{QuizBook, QuizBookDraft, QuizBookError, ValidatedBook};
pub use chapter::{Chapter, ChapterContent, ChapterError, Section};
pub use ids::{BookId, ChapterId, ParseIdError, SectionId};
pub use question::{QuestionAnswer, QuestionError};
