use crate::generate_extras::StubLlmProvider;
use chrono::TimeDelta;
use coursegen::generate::GenerateContext;
use coursegen::rate_limit::{
    ManualClock, MemoryWindowStore, RateLimitConfig, RateLimiter, WindowStore,
};
use coursegen::{CourseRequest, CourseService, GenerationOutcome, SourceType};
use spectral::prelude::*;
use std::sync::Arc;
use std::time::Duration;

mod generate_extras;

fn service(
    max_requests: u32,
) -> (
    CourseService<MemoryWindowStore, Arc<ManualClock>>,
    Arc<ManualClock>,
) {
    let clock = Arc::new(ManualClock::default());
    let config = RateLimitConfig {
        max_requests,
        window: Duration::from_secs(60),
    };
    let limiter = RateLimiter::with_parts(config, MemoryWindowStore::new(), Arc::clone(&clock));
    (CourseService::new(limiter), clock)
}

#[tokio::test]
async fn admitted_request_is_generated() {
    let (service, _clock) = service(10);
    let model = StubLlmProvider::new("## Notes\n### Basics\n- point one".to_owned());
    let ctx = GenerateContext {
        model: &model,
        prompt_template: None,
        pacer: None,
    };
    let request = CourseRequest::new(SourceType::Text, "Rust basics");

    let outcome = service
        .handle("u1", &request, &ctx)
        .await
        .expect("Expected successful handling.");

    match outcome {
        GenerationOutcome::Generated { course } => {
            assert_that(&course.notes).has_length(1);
            assert_that(&course.notes[0].body.as_str()).is_equal_to("• point one");
        }
        GenerationOutcome::RateLimited { .. } => panic!("Request should be admitted"),
    }
}

#[tokio::test]
async fn spent_quota_is_rate_limited_with_retry_hint() {
    let (service, clock) = service(1);
    let model = StubLlmProvider::new("### Basics\nText".to_owned());
    let ctx = GenerateContext {
        model: &model,
        prompt_template: None,
        pacer: None,
    };
    let request = CourseRequest::new(SourceType::Text, "Rust basics");

    service
        .handle("u1", &request, &ctx)
        .await
        .expect("Expected successful handling.");
    clock.advance(TimeDelta::milliseconds(20_500));

    let outcome = service
        .handle("u1", &request, &ctx)
        .await
        .expect("Expected successful handling.");

    assert_that(&outcome).is_equal_to(GenerationOutcome::RateLimited {
        retry_after_secs: 40,
    });
    assert_that(&model.prompts()).has_length(1);
}

#[tokio::test]
async fn invalid_request_is_rejected_before_admission() {
    let (service, _clock) = service(1);
    let model = StubLlmProvider::new("### Basics\nText".to_owned());
    let ctx = GenerateContext {
        model: &model,
        prompt_template: None,
        pacer: None,
    };
    let request = CourseRequest::new(SourceType::YouTube, "https://example.com/video");

    assert_that(&service.handle("u1", &request, &ctx).await.is_err()).is_true();
    assert_that(&service.limiter().store().get("u1")).is_none();
    assert_that(&model.prompts()).is_empty();
}

#[tokio::test]
async fn failed_generation_still_spends_quota() {
    let (service, _clock) = service(1);
    let model = StubLlmProvider::failing();
    let ctx = GenerateContext {
        model: &model,
        prompt_template: None,
        pacer: None,
    };
    let request = CourseRequest::new(SourceType::Text, "Rust basics");

    assert_that(&service.handle("u1", &request, &ctx).await.is_err()).is_true();

    let outcome = service
        .handle("u1", &request, &ctx)
        .await
        .expect("Expected successful handling.");
    assert_that(&matches!(outcome, GenerationOutcome::RateLimited { .. })).is_true();
}

#[test]
fn outcomes_serialize_with_status_tag() {
    let limited = GenerationOutcome::RateLimited {
        retry_after_secs: 12,
    };
    let json = serde_json::to_value(&limited).expect("Expected serializable outcome.");

    assert_that(&json).is_equal_to(serde_json::json!({
        "status": "rate_limited",
        "retryAfterSecs": 12
    }));

    let generated = GenerationOutcome::Generated {
        course: coursegen::parse("### Basics\nText"),
    };
    let json = serde_json::to_value(&generated).expect("Expected serializable outcome.");

    assert_that(&json["status"]).is_equal_to(serde_json::json!("generated"));
    assert_that(&json["course"]["notes"][0]["estimatedReadMinutes"])
        .is_equal_to(serde_json::json!(1));
}
