use thiserror::Error;

use crate::model::ids::{ChapterId, SectionId};
use crate::model::question::QuestionAnswer;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building chapters and sections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChapterError {
    #[error("chapter title cannot be empty")]
    EmptyTitle,

    #[error("section title cannot be empty")]
    EmptySectionTitle,

    #[error("chapter/section number must be >= 1")]
    InvalidNumber,

    #[error("duplicate section number {number} in chapter")]
    DuplicateSectionNumber { number: u32 },

    #[error("duplicate question number {number}")]
    DuplicateQuestionNumber { number: u32 },
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// A titled slice of a chapter holding its own questions.
///
/// Present only in books whose chapters subdivide into sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    title: String,
    number: u32,
    questions: Vec<QuestionAnswer>,
}

impl Section {
    /// Creates a new section.
    ///
    /// # Errors
    ///
    /// Returns `ChapterError::EmptySectionTitle` for a blank title,
    /// `ChapterError::InvalidNumber` for a zero number, or
    /// `ChapterError::DuplicateQuestionNumber` if two questions share a
    /// number.
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        number: u32,
        questions: Vec<QuestionAnswer>,
    ) -> Result<Self, ChapterError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ChapterError::EmptySectionTitle);
        }
        if number == 0 {
            return Err(ChapterError::InvalidNumber);
        }
        check_unique_question_numbers(&questions)?;

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            number,
            questions,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionAnswer] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub(crate) fn question_mut(&mut self, question_number: u32) -> Option<&mut QuestionAnswer> {
        self.questions
            .iter_mut()
            .find(|q| q.number() == question_number)
    }
}

//
// ─── CHAPTER CONTENT ───────────────────────────────────────────────────────────
//

/// What a chapter holds: either sections or direct questions, never both.
///
/// The variant makes the exclusivity invariant structural instead of a
/// convention over two optional collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterContent {
    WithSections(Vec<Section>),
    WithoutSections(Vec<QuestionAnswer>),
}

impl ChapterContent {
    /// Returns true when the chapter subdivides into sections.
    #[must_use]
    pub fn uses_sections(&self) -> bool {
        matches!(self, ChapterContent::WithSections(_))
    }

    /// Iterates over every question in the chapter, section boundaries
    /// flattened away.
    pub fn questions(&self) -> Box<dyn Iterator<Item = &QuestionAnswer> + '_> {
        match self {
            ChapterContent::WithSections(sections) => {
                Box::new(sections.iter().flat_map(|s| s.questions().iter()))
            }
            ChapterContent::WithoutSections(questions) => Box::new(questions.iter()),
        }
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        match self {
            ChapterContent::WithSections(sections) => {
                sections.iter().map(Section::question_count).sum()
            }
            ChapterContent::WithoutSections(questions) => questions.len(),
        }
    }
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// One chapter of a quiz book.
///
/// `number` is the chapter's 1-based ordinal within the book; the owning
/// `QuizBook` validates that chapter numbers are dense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    id: ChapterId,
    title: String,
    number: u32,
    content: ChapterContent,
}

impl Chapter {
    /// Creates a new chapter.
    ///
    /// # Errors
    ///
    /// Returns `ChapterError::EmptyTitle` for a blank title,
    /// `ChapterError::InvalidNumber` for a zero number, or a duplicate
    /// number error if sections or direct questions collide.
    pub fn new(
        id: ChapterId,
        title: impl Into<String>,
        number: u32,
        content: ChapterContent,
    ) -> Result<Self, ChapterError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ChapterError::EmptyTitle);
        }
        if number == 0 {
            return Err(ChapterError::InvalidNumber);
        }
        match &content {
            ChapterContent::WithSections(sections) => check_unique_section_numbers(sections)?,
            ChapterContent::WithoutSections(questions) => {
                check_unique_question_numbers(questions)?;
            }
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            number,
            content,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ChapterId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn content(&self) -> &ChapterContent {
        &self.content
    }

    #[must_use]
    pub fn uses_sections(&self) -> bool {
        self.content.uses_sections()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.content.question_count()
    }

    /// Looks up a question by section number (if the chapter uses
    /// sections) and question number.
    ///
    /// Returns `None` when the addressing mode does not match the
    /// chapter's layout or no such question exists.
    pub(crate) fn question_mut(
        &mut self,
        section_number: Option<u32>,
        question_number: u32,
    ) -> Option<&mut QuestionAnswer> {
        match (&mut self.content, section_number) {
            (ChapterContent::WithSections(sections), Some(section)) => sections
                .iter_mut()
                .find(|s| s.number() == section)?
                .question_mut(question_number),
            (ChapterContent::WithoutSections(questions), None) => questions
                .iter_mut()
                .find(|q| q.number() == question_number),
            _ => None,
        }
    }
}

fn check_unique_question_numbers(questions: &[QuestionAnswer]) -> Result<(), ChapterError> {
    let mut seen = std::collections::HashSet::new();
    for question in questions {
        if !seen.insert(question.number()) {
            return Err(ChapterError::DuplicateQuestionNumber {
                number: question.number(),
            });
        }
    }
    Ok(())
}

fn check_unique_section_numbers(sections: &[Section]) -> Result<(), ChapterError> {
    let mut seen = std::collections::HashSet::new();
    for section in sections {
        if !seen.insert(section.number()) {
            return Err(ChapterError::DuplicateSectionNumber {
                number: section.number(),
            });
        }
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn question(number: u32) -> QuestionAnswer {
        QuestionAnswer::new(number, None).unwrap()
    }

    #[test]
    fn section_rejects_blank_title() {
        let err = Section::new(SectionId::new(1), "   ", 1, vec![]).unwrap_err();
        assert_eq!(err, ChapterError::EmptySectionTitle);
    }

    #[test]
    fn section_rejects_duplicate_question_numbers() {
        let err =
            Section::new(SectionId::new(1), "S1", 1, vec![question(1), question(1)]).unwrap_err();
        assert_eq!(err, ChapterError::DuplicateQuestionNumber { number: 1 });
    }

    #[test]
    fn chapter_without_sections_iterates_direct_questions() {
        let chapter = Chapter::new(
            ChapterId::new(1),
            "Basics",
            1,
            ChapterContent::WithoutSections(vec![question(1), question(2)]),
        )
        .unwrap();

        assert!(!chapter.uses_sections());
        assert_eq!(chapter.question_count(), 2);
        let numbers: Vec<u32> = chapter.content().questions().map(|q| q.number()).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn chapter_with_sections_flattens_questions() {
        let s1 = Section::new(SectionId::new(1), "S1", 1, vec![question(1)]).unwrap();
        let s2 = Section::new(SectionId::new(2), "S2", 2, vec![question(1), question(2)]).unwrap();
        let chapter = Chapter::new(
            ChapterId::new(1),
            "Advanced",
            1,
            ChapterContent::WithSections(vec![s1, s2]),
        )
        .unwrap();

        assert!(chapter.uses_sections());
        assert_eq!(chapter.question_count(), 3);
    }

    #[test]
    fn chapter_rejects_duplicate_section_numbers() {
        let s1 = Section::new(SectionId::new(1), "S1", 1, vec![]).unwrap();
        let s2 = Section::new(SectionId::new(2), "S2", 1, vec![]).unwrap();
        let err = Chapter::new(
            ChapterId::new(1),
            "Dup",
            1,
            ChapterContent::WithSections(vec![s1, s2]),
        )
        .unwrap_err();
        assert_eq!(err, ChapterError::DuplicateSectionNumber { number: 1 });
    }

    #[test]
    fn question_lookup_respects_layout() {
        let s1 = Section::new(SectionId::new(1), "S1", 1, vec![question(4)]).unwrap();
        let mut sectioned = Chapter::new(
            ChapterId::new(1),
            "A",
            1,
            ChapterContent::WithSections(vec![s1]),
        )
        .unwrap();

        assert!(sectioned.question_mut(Some(1), 4).is_some());
        assert!(sectioned.question_mut(Some(2), 4).is_none());
        // Direct addressing does not resolve in a sectioned chapter.
        assert!(sectioned.question_mut(None, 4).is_none());

        let mut flat = Chapter::new(
            ChapterId::new(2),
            "B",
            2,
            ChapterContent::WithoutSections(vec![question(7)]),
        )
        .unwrap();
        assert!(flat.question_mut(None, 7).is_some());
        assert!(flat.question_mut(Some(1), 7).is_none());
    }

    #[test]
    fn chapter_trims_title() {
        let chapter = Chapter::new(
            ChapterId::new(1),
            "  Grammar  ",
            1,
            ChapterContent::WithoutSections(vec![]),
        )
        .unwrap();
        assert_eq!(chapter.title(), "Grammar");
    }
}
