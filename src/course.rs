//! Typed course content produced from a model completion.

use serde::Serialize;

/// A titled section of study notes.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    pub body: String,
    pub estimated_read_minutes: u32,
}

/// A multiple choice question with exactly four options.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: [String; 4],
    /// Index into `options`, always below 4.
    pub correct_index: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// Returns the text of the correct option.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub front: String,
    pub back: String,
    pub category: String,
}

/// Parse result of one completion.
///
/// Built once per generation request and never mutated afterwards. After
/// [`crate::parse::parse`] the `notes` sequence is never empty.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContent {
    pub notes: Vec<Note>,
    pub quizzes: Vec<QuizQuestion>,
    pub flashcards: Vec<Flashcard>,
}
