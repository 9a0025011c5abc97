//! The coursegen library turns a YouTube video, PDF files or free text into course
//! material: study notes, multiple choice quizzes and flashcards generated by an LLM.

pub mod constants;
pub mod course;
pub mod generate;
pub mod parse;
pub mod rate_limit;
pub mod request;
pub mod service;

/// Enum representing the kind of source a course is generated from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SourceType {
    /// A YouTube video URL
    YouTube,
    /// Comma-separated PDF file names
    Pdf,
    /// Free text
    #[default]
    Text,
}

impl SourceType {
    /// Returns the lowercase name used on the command line and in prompts.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::YouTube => "youtube",
            SourceType::Pdf => "pdf",
            SourceType::Text => "text",
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "youtube" => Ok(SourceType::YouTube),
            "pdf" => Ok(SourceType::Pdf),
            "text" => Ok(SourceType::Text),
            _ => Err(format!("Invalid source type: {}", input)),
        }
    }
}

pub use course::{CourseContent, Flashcard, Note, QuizQuestion};
pub use generate::generate_course;
pub use parse::parse;
pub use rate_limit::{Admission, RateLimitConfig, RateLimiter};
pub use request::{CourseRequest, validate};
pub use service::{CourseService, GenerationOutcome};
