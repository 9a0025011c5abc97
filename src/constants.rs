use std::time::Duration;

pub const MODEL_API_KEY_ENV_NAME: &str = "COURSEGEN_MODEL_API_KEY";

pub(crate) const THINK_STRIPPER: &str = r"<think>[\s\S]*</think>\s*";

/// Requests admitted per identity within one window.
pub const DEFAULT_MAX_REQUESTS: u32 = 10;
/// Length of a rate limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Upper bound of tracked identities before the memory store starts evicting.
pub const DEFAULT_STORE_CAPACITY: usize = 10_000;

/// Longest accepted request content and longest completion handed to the parser, in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

pub const YOUTUBE_HOSTS: [&str; 4] = ["www.youtube.com", "youtube.com", "youtu.be", "m.youtube.com"];
pub(crate) const YOUTUBE_TITLE: &str = "Course from YouTube Video";
pub(crate) const YOUTUBE_TITLE_ID_CHARS: usize = 8;

pub(crate) const WORDS_PER_MINUTE: usize = 200;
pub(crate) const DEFAULT_EXPLANATION: &str = "Explanation not provided.";
pub(crate) const DEFAULT_FLASHCARD_CATEGORY: &str = "General";
pub(crate) const FALLBACK_NOTE_TITLE: &str = "Generated Content";
pub(crate) const FALLBACK_NOTE_CHARS: usize = 800;
pub(crate) const FALLBACK_NOTE_READ_MINUTES: u32 = 5;
pub(crate) const ELLIPSIS: &str = "...";

pub const MODEL_TEMPERATURE: f32 = 0.7;
pub const MODEL_MAX_TOKENS: u32 = 4000;

pub const SYSTEM_PROMPT: &str = "You are an expert educational content creator. \
Generate high-quality, comprehensive educational content including detailed notes, \
challenging quiz questions, and useful flashcards. Always answer in exactly the \
markdown layout you are asked for.";

pub(crate) const OUTPUT_LAYOUT: &str = r#"
Answer in markdown using exactly this layout:

## Notes
### Section title
- key point
- key point

## Challenging Quizzes
**Question 1:** Question text
a) First option
b) Second option
c) Third option
d) Fourth option
**Correct:** b
**Explanation:** Why this answer is correct.

## Flashcards
**Front:** Term or concept
**Back:** Definition or explanation

Generate at least 5 comprehensive note sections, 10 quiz questions with exactly four options each, and 15 flashcards"#;

pub(crate) const YOUTUBE_PROMPT_TEMPLATE: &str =
    "Create educational content from this YouTube video URL: {content}\n{layout} based on the video content.";

pub(crate) const PDF_PROMPT_TEMPLATE: &str =
    "Create educational content from these PDF files: {content}\n{layout} based on the PDF content.";

pub(crate) const TEXT_PROMPT_TEMPLATE: &str =
    "Create educational content from this input: {content}\n{layout}.";
