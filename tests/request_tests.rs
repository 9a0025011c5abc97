use coursegen::{CourseRequest, SourceType, validate};
use spectral::prelude::*;
use std::str::FromStr;

macro_rules! assert_validation {
    (
        $(
            $test_name:ident : $source_type:ident, $content:expr => $valid:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                let request = CourseRequest::new(SourceType::$source_type, $content);
                assert_that(&validate(&request).is_ok()).is_equal_to($valid);
            }
        )+
    }
}

assert_validation![
    youtube_watch_url: YouTube, "https://www.youtube.com/watch?v=dQw4w9WgXcQ" => true,
    youtube_short_url: YouTube, "  https://youtu.be/dQw4w9WgXcQ  " => true,
    youtube_mobile_url: YouTube, "https://m.youtube.com/watch?v=abc" => true,
    youtube_foreign_host: YouTube, "https://vimeo.com/12345" => false,
    youtube_not_a_url: YouTube, "youtube video about rust" => false,
    pdf_single_file: Pdf, "lecture.PDF" => true,
    pdf_file_list: Pdf, "intro.pdf, chapter-2.pdf" => true,
    pdf_wrong_extension: Pdf, "notes.docx" => false,
    pdf_empty_name: Pdf, "intro.pdf,," => false,
    text_free_form: Text, "Ownership and borrowing in Rust" => true,
    blank_content: Text, "   \n" => false,
];

#[test]
fn content_length_is_limited() {
    let at_limit = CourseRequest::new(SourceType::Text, "a".repeat(10_000));
    let over_limit = CourseRequest::new(SourceType::Text, "a".repeat(10_001));

    assert_that(&validate(&at_limit).is_ok()).is_true();
    assert_that(&validate(&over_limit).is_err()).is_true();
}

#[test]
fn source_types_parse_case_insensitively() {
    assert_that(&SourceType::from_str("YouTube")).is_equal_to(Ok(SourceType::YouTube));
    assert_that(&SourceType::from_str("pdf")).is_equal_to(Ok(SourceType::Pdf));
    assert_that(&SourceType::from_str("TEXT")).is_equal_to(Ok(SourceType::Text));
    assert_that(&SourceType::from_str("audio").is_err()).is_true();
}

macro_rules! assert_display_title {
    (
        $(
            $test_name:ident : $source_type:ident, $content:expr => $title:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                let request = CourseRequest::new(SourceType::$source_type, $content);
                let expected: Option<&str> = $title;
                assert_that(&request.display_title()).is_equal_to(expected.map(str::to_owned));
            }
        )+
    }
}

assert_display_title![
    title_from_youtube_video_id: YouTube, "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42" => Some("Course from YouTube Video (dQw4w9Wg)"),
    title_from_youtube_without_id: YouTube, "https://www.youtube.com/playlist?list=PL1" => Some("Course from YouTube Video (Video)"),
    title_from_short_youtube_url: YouTube, "https://youtu.be/dQw4w9WgXcQ" => Some("Course from YouTube Video"),
    title_from_single_pdf: Pdf, " Rust Basics.PDF " => Some("Course: Rust Basics"),
    title_from_pdf_list: Pdf, "intro.pdf, traits.pdf, async.pdf" => Some("Multi-PDF Course (3 documents)"),
    no_title_for_text: Text, "Ownership and borrowing" => None,
];

#[test]
fn given_title_wins_over_derived_one() {
    let request = CourseRequest::new(SourceType::Pdf, "intro.pdf").with_title("  My course ");
    let blank = CourseRequest::new(SourceType::Pdf, "intro.pdf").with_title("   ");

    assert_that(&request.display_title()).is_equal_to(Some("My course".to_owned()));
    assert_that(&blank.display_title()).is_equal_to(Some("Course: intro".to_owned()));
}
