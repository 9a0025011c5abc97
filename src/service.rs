//! The service module handles one course generation request end to end:
//! validation, rate limiting, generation and parsing.

use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::course::CourseContent;
use crate::generate::{GenerateContext, generate_course};
use crate::rate_limit::{Admission, Clock, RateLimiter, WindowStore};
use crate::request::{CourseRequest, validate};

/// Outcome of a generation request.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// The caller spent its quota and should retry after the given delay.
    #[serde(rename_all = "camelCase")]
    RateLimited { retry_after_secs: u64 },
    Generated { course: CourseContent },
}

/// Request handler guarding course generation with a rate limiter.
pub struct CourseService<S, C> {
    limiter: RateLimiter<S, C>,
}

impl<S: WindowStore, C: Clock> CourseService<S, C> {
    /// Creates a service admitting requests through `limiter`.
    pub fn new(limiter: RateLimiter<S, C>) -> Self {
        CourseService { limiter }
    }

    /// Returns the rate limiter.
    pub fn limiter(&self) -> &RateLimiter<S, C> {
        &self.limiter
    }

    /// Handles a generation request of `identity`.
    ///
    /// The request is validated first, then admitted against the rate limit,
    /// and only then sent to the model. A rejected admission is a regular
    /// outcome. A slot consumed by an admitted request is not given back when
    /// generation fails afterwards.
    ///
    /// # Arguments
    ///
    /// * `identity` - The caller the rate limit applies to
    /// * `request` - The course request
    /// * `ctx` - Context containing model, prompt template, and pacer
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The request fails validation
    /// * The LLM chat operation fails
    pub async fn handle(
        &self,
        identity: &str,
        request: &CourseRequest,
        ctx: &GenerateContext<'_>,
    ) -> Result<GenerationOutcome> {
        validate(request)?;

        if let Admission::Rejected { retry_after } = self.limiter.check(identity) {
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            return Ok(GenerationOutcome::RateLimited { retry_after_secs });
        }

        let course = generate_course(request, ctx).await?;
        info!(
            "Generated course for {identity}: {} notes, {} quizzes, {} flashcards",
            course.notes.len(),
            course.quizzes.len(),
            course.flashcards.len()
        );

        Ok(GenerationOutcome::Generated { course })
    }
}
