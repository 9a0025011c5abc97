//! The request module describes a course generation request and checks it
//! before any work is done for it.

use anyhow::{Context, Result, bail};
use url::Url;

use crate::SourceType;
use crate::constants::{MAX_CONTENT_CHARS, YOUTUBE_HOSTS, YOUTUBE_TITLE, YOUTUBE_TITLE_ID_CHARS};

/// A request to generate a course from one source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CourseRequest {
    pub source_type: SourceType,
    /// YouTube URL, comma-separated PDF file names, or free text.
    pub content: String,
    pub title: Option<String>,
}

impl CourseRequest {
    /// Creates a request without a title.
    pub fn new(source_type: SourceType, content: impl Into<String>) -> Self {
        CourseRequest {
            source_type,
            content: content.into(),
            title: None,
        }
    }

    /// Sets the course title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the content with surrounding whitespace removed.
    pub fn trimmed_content(&self) -> &str {
        self.content.trim()
    }

    /// Returns the course title: the one given with the request, or one
    /// derived from the source when none was given.
    ///
    /// YouTube watch URLs are named after the first characters of their video
    /// id, PDF courses after their single file or their number of files. Free
    /// text gets no derived title.
    pub fn display_title(&self) -> Option<String> {
        if let Some(title) = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return Some(title.to_owned());
        }

        match self.source_type {
            SourceType::YouTube => Some(youtube_title(self.trimmed_content())),
            SourceType::Pdf => Some(pdf_title(self.trimmed_content())),
            SourceType::Text => None,
        }
    }
}

const PDF_EXTENSION: &str = ".pdf";

fn youtube_title(content: &str) -> String {
    let Ok(url) = Url::parse(content) else {
        return YOUTUBE_TITLE.to_owned();
    };
    if !url.host_str().is_some_and(|host| host.contains("youtube")) {
        return YOUTUBE_TITLE.to_owned();
    }

    let video_id = url
        .query_pairs()
        .find(|(name, _)| name == "v")
        .map(|(_, id)| id.chars().take(YOUTUBE_TITLE_ID_CHARS).collect::<String>())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| "Video".to_owned());
    format!("{YOUTUBE_TITLE} ({video_id})")
}

fn pdf_title(content: &str) -> String {
    let names: Vec<&str> = content
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    match names.as_slice() {
        &[name] => {
            let stem = name
                .len()
                .checked_sub(PDF_EXTENSION.len())
                .filter(|&cut| {
                    name.get(cut..)
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
                })
                .and_then(|cut| name.get(..cut))
                .unwrap_or(name);
            format!("Course: {stem}")
        }
        _ => format!("Multi-PDF Course ({} documents)", names.len()),
    }
}

/// Validates a course request.
///
/// # Arguments
///
/// * `request` - The request to check
///
/// # Errors
///
/// Returns an error if:
/// * The content is empty or longer than the accepted maximum
/// * A YouTube source is not a URL on a YouTube host
/// * A PDF source names a file without the `.pdf` extension
pub fn validate(request: &CourseRequest) -> Result<()> {
    let content = request.trimmed_content();
    if content.is_empty() {
        bail!("Content cannot be empty");
    }

    let length = content.chars().count();
    if length > MAX_CONTENT_CHARS {
        bail!("Content is too long: {length} characters, at most {MAX_CONTENT_CHARS} allowed");
    }

    match request.source_type {
        SourceType::YouTube => validate_youtube_url(content),
        SourceType::Pdf => validate_pdf_names(content),
        SourceType::Text => Ok(()),
    }
}

fn validate_youtube_url(content: &str) -> Result<()> {
    let url = Url::parse(content).context(format!("Please enter a valid URL: {content}"))?;
    match url.host_str() {
        Some(host) if YOUTUBE_HOSTS.contains(&host) => Ok(()),
        _ => bail!("Please enter a valid YouTube URL: {content}"),
    }
}

fn validate_pdf_names(content: &str) -> Result<()> {
    for name in content.split(',').map(str::trim) {
        if name.is_empty() {
            bail!("Empty PDF file name in: {content}");
        }
        if !name.to_lowercase().ends_with(PDF_EXTENSION) {
            bail!("File must be a PDF: {name}");
        }
    }

    Ok(())
}
