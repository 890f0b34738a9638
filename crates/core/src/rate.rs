//! Completion rate aggregation across sections, chapters, and books.
//!
//! A rate is the share of questions whose latest attempt is correct,
//! expressed as an integer percentage. Roll-ups always count questions, not
//! child rates: a chapter rate is computed over the union of its questions,
//! never as a mean of section rates, and the book rate likewise spans all
//! chapters' questions. Stored rate fields do not exist in this model; every
//! read recomputes from the attempt logs.

use crate::model::{Chapter, QuestionAnswer, QuizBook, Section};

/// Rate over an arbitrary set of questions. Zero questions yields 0 so the
/// value is always a plain number.
#[must_use]
pub fn questions_rate<'a, I>(questions: I) -> u8
where
    I: IntoIterator<Item = &'a QuestionAnswer>,
{
    let mut total: u64 = 0;
    let mut correct: u64 = 0;
    for question in questions {
        total += 1;
        if question.latest_is_correct() {
            correct += 1;
        }
    }
    percentage(correct, total)
}

/// Rate over one section's questions.
#[must_use]
pub fn section_rate(section: &Section) -> u8 {
    questions_rate(section.questions())
}

/// Rate over all of a chapter's questions, direct or inside sections.
#[must_use]
pub fn chapter_rate(chapter: &Chapter) -> u8 {
    questions_rate(chapter.content().questions())
}

/// Book-level rate over every question in every chapter.
#[must_use]
pub fn book_rate(book: &QuizBook) -> u8 {
    questions_rate(book.chapters().iter().flat_map(|c| c.content().questions()))
}

/// Integer percentage with half-up rounding. `total == 0` maps to 0.
fn percentage(correct: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    // (200c + t) / 2t rounds c/t to the nearest whole percent.
    let rounded = (200 * correct + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Attempt, AttemptResult, BookId, ChapterContent, ChapterId, QuizBookDraft, SectionId,
    };
    use crate::time::fixed_now;

    fn question(number: u32, latest: Option<AttemptResult>) -> QuestionAnswer {
        let mut q = QuestionAnswer::new(number, None).unwrap();
        if let Some(result) = latest {
            q.record(Attempt::new(1, result, fixed_now()).unwrap())
                .unwrap();
        }
        q
    }

    fn flat_chapter(number: u32, questions: Vec<QuestionAnswer>) -> Chapter {
        Chapter::new(
            ChapterId::new(u64::from(number)),
            format!("Chapter {number}"),
            number,
            ChapterContent::WithoutSections(questions),
        )
        .unwrap()
    }

    fn book(chapters: Vec<Chapter>) -> QuizBook {
        QuizBookDraft {
            title: "Book".into(),
            category: None,
            chapters,
        }
        .validate(fixed_now())
        .unwrap()
        .assign_id(BookId::new(1))
    }

    use AttemptResult::{Correct, Incorrect};

    #[test]
    fn empty_chapter_rates_zero() {
        let chapter = flat_chapter(1, vec![]);
        assert_eq!(chapter_rate(&chapter), 0);
    }

    #[test]
    fn unanswered_questions_count_against_the_rate() {
        let chapter = flat_chapter(1, vec![question(1, Some(Correct)), question(2, None)]);
        assert_eq!(chapter_rate(&chapter), 50);
    }

    #[test]
    fn half_correct_chapter_rates_fifty() {
        let chapter = flat_chapter(
            1,
            vec![question(1, Some(Correct)), question(2, Some(Incorrect))],
        );
        assert_eq!(chapter_rate(&chapter), 50);
    }

    #[test]
    fn rounding_is_half_up() {
        // 1/3 -> 33, 2/3 -> 67.
        let one_of_three = flat_chapter(
            1,
            vec![
                question(1, Some(Correct)),
                question(2, Some(Incorrect)),
                question(3, Some(Incorrect)),
            ],
        );
        assert_eq!(chapter_rate(&one_of_three), 33);

        let two_of_three = flat_chapter(
            1,
            vec![
                question(1, Some(Correct)),
                question(2, Some(Correct)),
                question(3, Some(Incorrect)),
            ],
        );
        assert_eq!(chapter_rate(&two_of_three), 67);
    }

    #[test]
    fn section_rates_compute_over_own_questions() {
        let section = Section::new(
            SectionId::new(1),
            "S1",
            1,
            vec![question(1, Some(Correct)), question(2, Some(Correct))],
        )
        .unwrap();
        assert_eq!(section_rate(&section), 100);
    }

    #[test]
    fn chapter_rate_weights_sections_by_question_count() {
        // Section 1: 1/1 correct (rate 100). Section 2: 1/3 correct (rate 33).
        // Weighted by questions: 2/4 = 50. A mean of section rates would say 67.
        let s1 = Section::new(SectionId::new(1), "S1", 1, vec![question(1, Some(Correct))])
            .unwrap();
        let s2 = Section::new(
            SectionId::new(2),
            "S2",
            2,
            vec![
                question(1, Some(Correct)),
                question(2, Some(Incorrect)),
                question(3, Some(Incorrect)),
            ],
        )
        .unwrap();
        let chapter = Chapter::new(
            ChapterId::new(1),
            "C1",
            1,
            ChapterContent::WithSections(vec![s1, s2]),
        )
        .unwrap();
        assert_eq!(chapter_rate(&chapter), 50);
    }

    #[test]
    fn book_rate_weights_chapters_by_question_count() {
        // Chapter 1: 1/1 (100). Chapter 2: 1/3 (33).
        // Weighted book rate: 2/4 = 50, not the simple mean of 67.
        let c1 = flat_chapter(1, vec![question(1, Some(Correct))]);
        let c2 = flat_chapter(
            2,
            vec![
                question(1, Some(Correct)),
                question(2, Some(Incorrect)),
                question(3, Some(Incorrect)),
            ],
        );
        let book = book(vec![c1, c2]);
        assert_eq!(book_rate(&book), 50);
    }

    #[test]
    fn book_with_no_chapters_rates_zero() {
        assert_eq!(book_rate(&book(vec![])), 0);
    }
}
