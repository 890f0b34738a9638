#![forbid(unsafe_code)]

pub mod app_services;
pub mod backend;
pub mod book_lookup;
pub mod error;
pub mod progress_store;

pub use doriloop_core::Clock;

pub use app_services::{AppConfig, AppServices};
pub use backend::{BackendClient, StudyRecord, UserProfile};
pub use book_lookup::{BookLookup, BookMetadata};
pub use error::{BackendError, LookupError, ProgressError, ValidationError};
pub use progress_store::{
    BookProgress, ChapterProgress, ProgressStore, QuestionProgress, QuestionRef, QuizBookChanges,
    SectionProgress,
};
