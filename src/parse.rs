//! The parse module turns a free-form model completion into typed course content.
//!
//! Parsing never fails. The completion is split into lines, each line is
//! classified by [`line::Line::classify`], and the classified lines are folded
//! into notes, quiz questions and flashcards by a small state machine. Records
//! that do not meet their structural requirements are dropped one by one.

pub mod line;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{
    DEFAULT_EXPLANATION, DEFAULT_FLASHCARD_CATEGORY, ELLIPSIS, FALLBACK_NOTE_CHARS,
    FALLBACK_NOTE_READ_MINUTES, FALLBACK_NOTE_TITLE, WORDS_PER_MINUTE,
};
use crate::course::{CourseContent, Flashcard, Note, QuizQuestion};
use line::{Line, LineKind, Zone, correct_index};

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*]\s+").expect("Failed to compile BULLET regex"));

const BULLET_GLYPH: &str = "• ";

/// Parses a model completion into course content.
///
/// Entities keep the order in which their markers occur in `raw_text`. When no
/// note can be extracted a single fallback note built from the beginning of
/// the input is returned, so `notes` is never empty.
///
/// # Arguments
///
/// * `raw_text` - The completion returned by the model
pub fn parse(raw_text: &str) -> CourseContent {
    let mut scanner = Scanner::default();
    for raw in raw_text.lines() {
        scanner.feed(Line::classify(raw));
    }

    let mut content = scanner.finish();
    if content.notes.is_empty() {
        debug!("No notes found in completion, using fallback note");
        content.notes.push(fallback_note(raw_text));
    }

    debug!(
        "Parsed {} notes, {} quizzes, {} flashcards",
        content.notes.len(),
        content.quizzes.len(),
        content.flashcards.len()
    );

    content
}

/// Builds the placeholder note used when a completion yields no notes.
fn fallback_note(raw_text: &str) -> Note {
    let mut body: String = raw_text.chars().take(FALLBACK_NOTE_CHARS).collect();
    body.push_str(ELLIPSIS);

    Note {
        title: FALLBACK_NOTE_TITLE.to_owned(),
        body,
        estimated_read_minutes: FALLBACK_NOTE_READ_MINUTES,
    }
}

/// Scanner position within the completion.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
enum ScanState {
    #[default]
    AwaitingZone,
    InNotes,
    InQuizzes,
    InFlashcards,
}

impl From<Zone> for ScanState {
    fn from(zone: Zone) -> Self {
        match zone {
            Zone::Notes => ScanState::InNotes,
            Zone::Quizzes => ScanState::InQuizzes,
            Zone::Flashcards => ScanState::InFlashcards,
        }
    }
}

/// The record currently being collected.
enum Draft<'a> {
    Note(NoteDraft<'a>),
    Quiz(QuizDraft),
    Card(CardDraft),
}

#[derive(Default)]
struct Scanner<'a> {
    state: ScanState,
    open: Option<Draft<'a>>,
    content: CourseContent,
}

impl<'a> Scanner<'a> {
    fn feed(&mut self, line: Line<'a>) {
        match line.kind {
            LineKind::ZoneHeading(zone) => {
                self.close();
                self.state = zone.into();
            }
            LineKind::OtherHeading => {
                self.close();
                self.state = ScanState::AwaitingZone;
            }
            LineKind::SubHeading(title) => {
                self.close();
                if self.state == ScanState::AwaitingZone {
                    self.state = ScanState::InNotes;
                }
                if self.state == ScanState::InNotes {
                    self.open = Some(Draft::Note(NoteDraft::new(title)));
                }
            }
            // Inside the notes zone record markers are plain body text.
            LineKind::QuestionMarker(text) if self.state != ScanState::InNotes => {
                self.close();
                self.state = ScanState::InQuizzes;
                self.open = Some(Draft::Quiz(QuizDraft::new(text)));
            }
            LineKind::FrontMarker(text) if self.state != ScanState::InNotes => {
                self.close();
                self.state = ScanState::InFlashcards;
                self.open = Some(Draft::Card(CardDraft::new(text)));
            }
            kind => self.feed_open(line.raw, kind),
        }
    }

    /// Hands a non-boundary line to the open record, if any.
    fn feed_open(&mut self, raw: &'a str, kind: LineKind<'a>) {
        match (&mut self.open, kind) {
            (Some(Draft::Note(note)), LineKind::Blank) => note.push_blank(),
            (Some(Draft::Note(note)), _) => note.push_line(raw),
            (Some(Draft::Quiz(quiz)), LineKind::OptionLine(letter, text)) => {
                quiz.push_option(letter, text);
            }
            (Some(Draft::Quiz(quiz)), LineKind::CorrectMarker(text)) => quiz.set_correct(text),
            (Some(Draft::Quiz(quiz)), LineKind::ExplanationMarker(text)) => {
                quiz.set_explanation(text);
            }
            (Some(Draft::Quiz(quiz)), LineKind::Text) => quiz.continue_with(raw),
            (Some(Draft::Card(card)), LineKind::BackMarker(text)) => card.set_back(text),
            (Some(Draft::Card(card)), LineKind::Text) => card.continue_with(raw),
            _ => {}
        }
    }

    /// Finishes the open record and keeps it when it is well-formed.
    fn close(&mut self) {
        match self.open.take() {
            Some(Draft::Note(draft)) => self.content.notes.extend(draft.build()),
            Some(Draft::Quiz(draft)) => self.content.quizzes.extend(draft.build()),
            Some(Draft::Card(draft)) => self.content.flashcards.extend(draft.build()),
            None => {}
        }
    }

    fn finish(mut self) -> CourseContent {
        self.close();
        self.content
    }
}

struct NoteDraft<'a> {
    title: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> NoteDraft<'a> {
    fn new(title: &'a str) -> Self {
        NoteDraft {
            title,
            lines: Vec::new(),
        }
    }

    fn push_line(&mut self, raw: &'a str) {
        self.lines.push(raw);
    }

    fn push_blank(&mut self) {
        self.lines.push("");
    }

    fn build(self) -> Option<Note> {
        let title = self.title.trim();
        let body = normalize_body(&self.lines);
        if title.is_empty() || body.is_empty() {
            debug!("Dropping note with empty title or body: {title:?}");
            return None;
        }

        Some(Note {
            title: title.to_owned(),
            estimated_read_minutes: read_minutes(&body),
            body,
        })
    }
}

/// Normalizes bullets to a single glyph and collapses blank line runs.
fn normalize_body(lines: &[&str]) -> String {
    let mut normalized: Vec<String> = Vec::with_capacity(lines.len());
    let mut previous_blank = false;

    for line in lines {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        normalized.push(BULLET.replace(line, format!("${{1}}{BULLET_GLYPH}")).into_owned());
    }

    normalized.join("\n").trim().to_owned()
}

fn read_minutes(body: &str) -> u32 {
    let words = body
        .split_whitespace()
        .filter(|word| *word != BULLET_GLYPH.trim())
        .count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Field of a question that continuation lines are appended to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum QuizField {
    Prompt,
    Option,
    Explanation,
    Closed,
}

struct QuizDraft {
    prompt: String,
    options: Vec<(char, String)>,
    correct: Option<String>,
    explanation: Option<String>,
    field: QuizField,
}

impl QuizDraft {
    fn new(text: &str) -> Self {
        QuizDraft {
            prompt: text.to_owned(),
            options: Vec::with_capacity(4),
            correct: None,
            explanation: None,
            field: QuizField::Prompt,
        }
    }

    fn push_option(&mut self, letter: char, text: &str) {
        self.options.push((letter, text.to_owned()));
        self.field = QuizField::Option;
    }

    fn set_correct(&mut self, text: &str) {
        if self.correct.is_none() {
            self.correct = Some(text.to_owned());
        }
        self.field = QuizField::Closed;
    }

    fn set_explanation(&mut self, text: &str) {
        if self.explanation.is_none() {
            self.explanation = Some(text.to_owned());
            self.field = QuizField::Explanation;
        } else {
            self.field = QuizField::Closed;
        }
    }

    fn continue_with(&mut self, raw: &str) {
        let target = match self.field {
            QuizField::Prompt => Some(&mut self.prompt),
            QuizField::Option => self.options.last_mut().map(|(_, text)| text),
            QuizField::Explanation => self.explanation.as_mut(),
            QuizField::Closed => None,
        };
        if let Some(target) = target {
            append_words(target, raw);
        }
    }

    fn build(self) -> Option<QuizQuestion> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            debug!("Dropping question without text");
            return None;
        }

        let letters: Vec<char> = self.options.iter().map(|(letter, _)| *letter).collect();
        if letters != ['a', 'b', 'c', 'd']
            || self.options.iter().any(|(_, text)| text.trim().is_empty())
        {
            debug!("Dropping question with malformed options: {prompt:?}");
            return None;
        }

        let Some(correct_index) = self.correct.as_deref().and_then(correct_index) else {
            debug!("Dropping question without a valid correct answer: {prompt:?}");
            return None;
        };

        let options: [String; 4] = self
            .options
            .into_iter()
            .map(|(_, text)| text.trim().to_owned())
            .collect::<Vec<_>>()
            .try_into()
            .ok()?;

        let explanation = self
            .explanation
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_owned());

        Some(QuizQuestion {
            prompt: prompt.to_owned(),
            options,
            correct_index,
            explanation,
        })
    }
}

struct CardDraft {
    front: String,
    back: Option<String>,
}

impl CardDraft {
    fn new(text: &str) -> Self {
        CardDraft {
            front: text.to_owned(),
            back: None,
        }
    }

    fn set_back(&mut self, text: &str) {
        if self.back.is_none() {
            self.back = Some(text.to_owned());
        }
    }

    fn continue_with(&mut self, raw: &str) {
        let target = match self.back.as_mut() {
            Some(back) => back,
            None => &mut self.front,
        };
        append_words(target, raw);
    }

    fn build(self) -> Option<Flashcard> {
        let front = self.front.trim();
        let back = self
            .back
            .map(|back| back.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        if front.is_empty() || back.is_empty() {
            debug!("Dropping flashcard with a missing side: {front:?}");
            return None;
        }

        Some(Flashcard {
            front: front.to_owned(),
            back,
            category: DEFAULT_FLASHCARD_CATEGORY.to_owned(),
        })
    }
}

/// Appends a continuation line, separated by a single space.
fn append_words(target: &mut String, raw: &str) {
    let raw = raw.trim();
    if raw.is_empty() {
        return;
    }
    if !target.trim().is_empty() {
        target.push(' ');
    }
    target.push_str(raw);
}
