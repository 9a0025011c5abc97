//! Line classifier for model completions.
//!
//! Every line of a completion is classified on its own, without context. The
//! meaning of a classified line (whether an option line belongs to a question
//! or is just a lettered list inside a note) is decided later by the scanner.

use once_cell::sync::Lazy;
use regex::Regex;

/// Top-level section of a completion.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Zone {
    Notes,
    Quizzes,
    Flashcards,
}

impl Zone {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
        match label.to_lowercase().as_str() {
            "notes" => Some(Zone::Notes),
            "quizzes" | "challenging quizzes" => Some(Zone::Quizzes),
            "flashcards" => Some(Zone::Flashcards),
            _ => None,
        }
    }
}

/// Marker type of a single line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LineKind<'a> {
    Blank,
    /// `## Notes`, `# Challenging Quizzes:`, `**Flashcards**`; never `###` or deeper.
    ZoneHeading(Zone),
    /// `### Title`, the note boundary.
    SubHeading(&'a str),
    /// A `#` or `##` heading that names no zone.
    OtherHeading,
    /// `**Question 3:** text`, carrying the text after the marker.
    QuestionMarker(&'a str),
    /// `a) text`, carrying the lowercased letter and the option text.
    OptionLine(char, &'a str),
    /// `**Correct:** b`, carrying everything after the marker.
    CorrectMarker(&'a str),
    ExplanationMarker(&'a str),
    FrontMarker(&'a str),
    BackMarker(&'a str),
    Text,
}

/// A raw line together with its classification.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line<'a> {
    pub raw: &'a str,
    pub kind: LineKind<'a>,
}

static ZONE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:#{1,2}\s*(?:\*\*)?|\*\*)\s*(notes|challenging\s+quizzes|quizzes|flashcards)\s*:?\s*(?:\*\*)?\s*:?\s*#*\s*$")
        .expect("Failed to compile ZONE_HEADING regex")
});

static QUESTION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:#{1,6}\s*)?(?:[-*]\s+)?(?:\*\*)?\s*question\s*\d+\s*[:.)]?\s*(?:\*\*)?\s*:?\s*(.*)$")
        .expect("Failed to compile QUESTION_MARKER regex")
});

static SUB_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#{3,6}\s+(.*)$").expect("Failed to compile SUB_HEADING regex")
});

static OTHER_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#{1,2}(?:\s|$)").expect("Failed to compile OTHER_HEADING regex")
});

static FIELD_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*]\s+)?(?:\*\*)?\s*(correct(?:\s+answer)?|explanation|front|back)\s*(?:\*\*)?\s*:\s*(?:\*\*)?\s*(.*)$")
        .expect("Failed to compile FIELD_MARKER regex")
});

static OPTION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*]\s+)?(?:\*\*)?\(?([a-zA-Z])\)(?:\*\*)?\s*(.*)$")
        .expect("Failed to compile OPTION_LINE regex")
});

impl<'a> Line<'a> {
    /// Classifies one line of a completion.
    pub fn classify(raw: &'a str) -> Self {
        Line {
            raw,
            kind: classify_kind(raw),
        }
    }
}

fn classify_kind(raw: &str) -> LineKind<'_> {
    if raw.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some(zone) = ZONE_HEADING
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Zone::from_label(label.as_str()))
    {
        return LineKind::ZoneHeading(zone);
    }

    if let Some(caps) = QUESTION_MARKER.captures(raw) {
        return LineKind::QuestionMarker(capture_text(&caps, 1));
    }

    if let Some(caps) = SUB_HEADING.captures(raw) {
        return LineKind::SubHeading(heading_title(capture_text(&caps, 1)));
    }

    if OTHER_HEADING.is_match(raw) {
        return LineKind::OtherHeading;
    }

    if let Some(caps) = FIELD_MARKER.captures(raw) {
        let text = capture_text(&caps, 2);
        let field = caps
            .get(1)
            .map(|name| name.as_str().to_lowercase())
            .unwrap_or_default();
        return match field.as_str() {
            "explanation" => LineKind::ExplanationMarker(text),
            "front" => LineKind::FrontMarker(text),
            "back" => LineKind::BackMarker(text),
            _ => LineKind::CorrectMarker(text),
        };
    }

    if let Some(caps) = OPTION_LINE.captures(raw)
        && let Some(letter) = caps
            .get(1)
            .and_then(|letter| letter.as_str().chars().next())
    {
        return LineKind::OptionLine(letter.to_ascii_lowercase(), capture_text(&caps, 2));
    }

    LineKind::Text
}

fn capture_text<'a>(caps: &regex::Captures<'a>, index: usize) -> &'a str {
    caps.get(index)
        .map(|text| strip_emphasis(text.as_str()))
        .unwrap_or_default()
}

/// Trims whitespace and stray bold markers around a marker's text.
fn strip_emphasis(text: &str) -> &str {
    text.trim().trim_matches('*').trim()
}

fn heading_title(text: &str) -> &str {
    strip_emphasis(text.trim_end_matches('#'))
        .trim_end_matches(':')
        .trim_end()
}

/// Maps an answer letter such as `b`, `B)` or `(c) 42` to its option index.
///
/// Anything but a single letter from `a` to `d` yields `None`.
pub fn correct_index(marker_text: &str) -> Option<usize> {
    let text = marker_text.trim_start_matches(['*', '(', ' ', '\t']);
    let mut chars = text.chars();
    let letter = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some_and(char::is_alphanumeric) {
        return None;
    }

    match letter {
        'a' => Some(0),
        'b' => Some(1),
        'c' => Some(2),
        'd' => Some(3),
        _ => None,
    }
}
