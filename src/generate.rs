//! The generate module asks an LLM model for course material about a source
//! and parses the completion into course content.

use anyhow::Result;
use llm::chat::{ChatMessage, ChatMessageBuilder, ChatProvider};
use log::{debug, info};
use once_cell::sync::Lazy;
use rate_guard::{RateLimit, StdTokenBucket, TokenBucketBuilder};
use regex::Regex;
use std::time::Duration;

use crate::SourceType;
use crate::constants::{
    MAX_CONTENT_CHARS, OUTPUT_LAYOUT, PDF_PROMPT_TEMPLATE, TEXT_PROMPT_TEMPLATE, THINK_STRIPPER,
    YOUTUBE_PROMPT_TEMPLATE,
};
use crate::course::CourseContent;
use crate::parse::parse;
use crate::request::CourseRequest;

static THINK_STRIPPER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(THINK_STRIPPER).expect("Failed to compile THINK_STRIPPER regex"));

/// Configuration containing shared data for generation requests
pub struct GenerateContext<'a> {
    /// LLM model to generate course material with
    pub model: &'a dyn ChatProvider,
    /// Prompt template replacing the built-in one for every source type
    pub prompt_template: Option<&'a str>,
    /// Pacer spacing out calls to the model
    pub pacer: Option<&'a StdTokenBucket>,
}

/// Builds a token bucket allowing `rpm` model calls per minute.
///
/// Returns `None` when no limit is requested or the bucket cannot be built.
pub fn build_pacer(rpm: Option<u32>) -> Option<StdTokenBucket> {
    rpm.and_then(|rpm| {
        let capacity = u64::from(rpm.max(1));
        let refill_interval = Duration::from_secs_f64(60.0 / capacity as f64);

        TokenBucketBuilder::builder()
            .capacity(capacity)
            .refill_amount(1_u64)
            .refill_every(refill_interval)
            .with_time(rate_guard::StdTimeSource::new())
            .with_precision::<rate_guard::Nanos>()
            .build()
            .ok()
    })
}

/// Renders the prompt for a request.
///
/// Templates may use the `{source}`, `{content}` and `{layout}` placeholders.
/// The course title, given or derived from the source, is appended.
/// The returned flag tells whether the content was embedded in the prompt.
pub fn build_prompt(request: &CourseRequest, prompt_template: Option<&str>) -> (String, bool) {
    let template = prompt_template.unwrap_or(match request.source_type {
        SourceType::YouTube => YOUTUBE_PROMPT_TEMPLATE,
        SourceType::Pdf => PDF_PROMPT_TEMPLATE,
        SourceType::Text => TEXT_PROMPT_TEMPLATE,
    });

    let mut prompt = template
        .replace("{source}", request.source_type.as_str())
        .replace("{layout}", OUTPUT_LAYOUT)
        .replace("{content}", request.trimmed_content());

    if let Some(title) = request.display_title() {
        prompt.push_str(&format!("\nThe course is titled \"{title}\"."));
    }

    (prompt, template.contains("{content}"))
}

/// Generates course content for a request.
///
/// # Arguments
///
/// * `request` - A validated course request
/// * `ctx` - Context containing model, prompt template, and pacer
///
/// # Returns
///
/// Returns the parsed course content, which always holds at least one note
///
/// # Errors
///
/// Returns an error if the LLM chat operation fails
pub async fn generate_course(
    request: &CourseRequest,
    ctx: &GenerateContext<'_>,
) -> Result<CourseContent> {
    let completion = request_completion(request, ctx).await?;
    Ok(parse(&completion))
}

/// Sends the prompt for a request to the model and returns the cleaned completion.
///
/// The completion has `<think>` blocks removed, is trimmed, and is cut to the
/// maximum length handed to the parser.
///
/// # Errors
///
/// Returns an error if the LLM chat operation fails
pub async fn request_completion(
    request: &CourseRequest,
    ctx: &GenerateContext<'_>,
) -> Result<String> {
    let (prompt, embedded) = build_prompt(request, ctx.prompt_template);

    let mut messages: Vec<ChatMessageBuilder> = vec![ChatMessage::user().content(prompt)];
    if !embedded {
        messages.push(ChatMessage::user().content(request.trimmed_content()));
    }

    let messages: Vec<ChatMessage> = messages
        .into_iter()
        .map(|message| message.build())
        .collect();

    if let Some(pacer) = ctx.pacer {
        loop {
            match pacer.try_acquire(1) {
                Ok(()) => break,
                Err(_) => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    info!("Requesting {} course material from the model...", request.source_type.as_str());
    let response = ctx
        .model
        .chat(&messages)
        .await
        .map_err(|err| anyhow::anyhow!("LLM error: {err}."))?
        .to_string();

    let completion = THINK_STRIPPER_REGEX
        .replace_all(&response, "")
        .trim()
        .to_owned();

    debug!(
        "Completion preview: {}",
        completion.chars().take(200).collect::<String>()
    );

    Ok(truncate_chars(completion, MAX_CONTENT_CHARS))
}

fn truncate_chars(mut text: String, max_chars: usize) -> String {
    let cut = text.char_indices().nth(max_chars).map(|(cut, _)| cut);
    if let Some(cut) = cut {
        debug!("Truncating completion to {max_chars} characters");
        text.truncate(cut);
    }
    text
}
