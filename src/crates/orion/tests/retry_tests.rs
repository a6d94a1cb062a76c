//! Integration tests for the quota retry on the fallback path

mod common;

use std::time::Duration;

use common::{harness, harness_with, ScriptedModel};
use llm::LlmError;
use orion::{ErrorClass, IntentKind};

fn quota() -> LlmError {
    LlmError::RateLimitExceeded("429 RESOURCE_EXHAUSTED: quota exceeded".into())
}

#[tokio::test]
async fn test_success_needs_no_backoff() {
    let h = harness(ScriptedModel::replying("  Hola, ¿en qué te ayudo?\n"));
    let reply = h.engine.handle("¿Qué es Rust?").await;

    assert_eq!(reply.text, "Hola, ¿en qué te ayudo?");
    assert_eq!(reply.intent, Some(IntentKind::Fallback));
    assert_eq!(h.model.calls(), 1);
    assert!(h.delay.requested().is_empty());
}

#[tokio::test]
async fn test_one_backoff_then_success() {
    let h = harness(ScriptedModel::new(vec![Err(quota()), Ok("Listo.".into())]));
    let reply = h.engine.handle("¿Qué es Rust?").await;

    assert_eq!(reply.text, "Listo.");
    assert_eq!(reply.class, None);
    assert_eq!(h.model.calls(), 2);
    assert_eq!(h.delay.requested(), vec![Duration::from_secs(45)]);
}

#[tokio::test]
async fn test_quota_text_without_typed_variant_is_retried() {
    let h = harness(ScriptedModel::new(vec![
        Err(LlmError::ProviderError("You exceeded your current QUOTA".into())),
        Ok("Listo.".into()),
    ]));

    assert_eq!(h.engine.handle("¿Qué es Rust?").await.text, "Listo.");
    assert_eq!(h.model.calls(), 2);
}

#[tokio::test]
async fn test_two_quota_failures_exhaust_retry() {
    let h = harness(ScriptedModel::new(vec![Err(quota()), Err(quota()), Ok("never".into())]));
    let reply = h.engine.handle("¿Qué es Rust?").await;

    assert!(reply.text.starts_with("Error persistente tras reintento: "));
    assert!(reply.text.contains("429"));
    assert_eq!(reply.class, Some(ErrorClass::RateLimited));
    assert_eq!(h.model.calls(), 2);
    assert_eq!(h.delay.requested().len(), 1);
}

#[tokio::test]
async fn test_retry_failing_for_other_reason_is_upstream() {
    let h = harness(ScriptedModel::new(vec![
        Err(quota()),
        Err(LlmError::ProviderError("503 backend down".into())),
    ]));
    let reply = h.engine.handle("¿Qué es Rust?").await;

    assert!(reply.text.starts_with("Error persistente tras reintento: "));
    assert!(reply.text.contains("503 backend down"));
    assert_eq!(reply.class, Some(ErrorClass::UpstreamUnavailable));
    assert_eq!(h.model.calls(), 2);
}

#[tokio::test]
async fn test_other_failure_is_not_retried() {
    let h = harness(ScriptedModel::new(vec![
        Err(LlmError::AuthenticationError("API key not valid".into())),
        Ok("never".into()),
    ]));
    let reply = h.engine.handle("¿Qué es Rust?").await;

    assert_eq!(
        reply.text,
        "Error al usar Gemini: Authentication failed: API key not valid"
    );
    assert_eq!(reply.class, Some(ErrorClass::UpstreamUnavailable));
    assert_eq!(h.model.calls(), 1);
    assert!(h.delay.requested().is_empty());
}

#[tokio::test]
async fn test_configured_backoff_is_used() {
    let h = harness_with(
        ScriptedModel::new(vec![Err(quota()), Ok("ok".into())]),
        |config| config.retry.backoff_secs = 2,
    );

    h.engine.handle("¿Qué es Rust?").await;
    assert_eq!(h.delay.requested(), vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_missing_key_reports_on_fallback_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::offline_config(dir.path());
    let engine = orion::DispatchEngine::from_config(&config).unwrap();

    let greeting = engine.handle("hola").await;
    assert_eq!(greeting.class, None);

    let reply = engine.handle("¿Qué es Rust?").await;
    assert!(reply.text.starts_with("Error al usar Gemini: API key not found"));
    assert_eq!(reply.class, Some(ErrorClass::UpstreamUnavailable));
}
