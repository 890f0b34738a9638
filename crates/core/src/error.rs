use thiserror::Error;

use crate::model::{AttemptError, ChapterError, QuestionError, QuizBookError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Chapter(#[from] ChapterError),
    #[error(transparent)]
    QuizBook(#[from] QuizBookError),
}
