// End-to-end pipeline tests over a scripted transport: cache behavior,
// validation fatalities, and backend-specific fallback content.

mod test_utils;

use mentora_core::{PerformanceCategory, QuizRequest, StudentMetrics, TutorRequest};
use mentora_services::{PredictionAdapter, QuizAdapter, TutorAdapter};
use serde_json::json;
use std::time::Duration;
use test_utils::{StubReply, StubTransport, fast_config, stub_service};

fn answer_payload(text: &str) -> StubReply {
    StubReply::Json(json!({"answer": text, "sources": []}))
}

#[tokio::test]
async fn second_identical_call_is_served_from_cache() -> anyhow::Result<()> {
    let stub = StubTransport::sequence(vec![answer_payload("Osmosis moves water.")]);
    let service = stub_service(TutorAdapter, &stub, &fast_config());
    let request = TutorRequest::builder().question("What is osmosis?").build()?;

    let first = service.call(&request).await;
    let second = service.call(&request).await;

    // One network dispatch; the repeat came from cache and is identical.
    assert_eq!(stub.call_count(), 1);
    assert_eq!(first, second);
    assert!(!second.degraded);

    let metrics = service.metrics();
    assert_eq!(metrics.successes, 1);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.total_requests, 2);
    Ok(())
}

#[tokio::test]
async fn different_context_misses_the_cache() -> anyhow::Result<()> {
    let stub = StubTransport::sequence(vec![
        answer_payload("Plain answer."),
        answer_payload("Contextual answer."),
    ]);
    let service = stub_service(TutorAdapter, &stub, &fast_config());

    let plain = TutorRequest::builder().question("What is osmosis?").build()?;
    let contextual = TutorRequest::builder()
        .question("What is osmosis?")
        .context(Some("biology revision".to_string()))
        .build()?;

    service.call(&plain).await;
    service.call(&contextual).await;

    assert_eq!(stub.call_count(), 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_entry_triggers_a_fresh_dispatch() -> anyhow::Result<()> {
    let stub = StubTransport::sequence(vec![
        answer_payload("First answer."),
        answer_payload("Second answer."),
    ]);
    let mut config = fast_config();
    config.cache_ttl_secs = 1;
    let service = stub_service(TutorAdapter, &stub, &config);
    let request = TutorRequest::builder().question("What is osmosis?").build()?;

    service.call(&request).await;
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    let refreshed = service.call(&request).await;

    assert_eq!(stub.call_count(), 2);
    assert_eq!(refreshed.value.answer, "Second answer.");
    Ok(())
}

#[tokio::test]
async fn surplus_questions_are_truncated_to_the_request() -> anyhow::Result<()> {
    let questions: Vec<_> = (1..=7)
        .map(|i| json!({"id": format!("q{i}"), "question": format!("Question {i}?")}))
        .collect();
    let stub = StubTransport::sequence(vec![StubReply::Json(json!({
        "quiz_id": "remote-1",
        "questions": questions,
    }))]);
    let service = stub_service(QuizAdapter, &stub, &fast_config());
    let request = QuizRequest::builder()
        .topics(vec!["algebra".to_string()])
        .n_questions(5)
        .build()?;

    let reply = service.call(&request).await;

    assert!(!reply.degraded);
    assert_eq!(reply.value.questions.len(), 5);
    assert_eq!(reply.value.total_questions, 5);
    Ok(())
}

#[tokio::test]
async fn blank_answer_is_fatal_and_falls_back() -> anyhow::Result<()> {
    let stub = StubTransport::always(StubReply::Json(json!({"answer": ""})));
    let service = stub_service(TutorAdapter, &stub, &fast_config());
    let request = TutorRequest::builder()
        .question("Explain photosynthesis")
        .build()?;

    let reply = service.call(&request).await;

    // Malformed payload from a reachable server: one attempt, no retry.
    assert_eq!(stub.call_count(), 1);
    assert!(reply.degraded);
    assert!(reply.reason.as_deref().unwrap().contains("answer"));
    assert!(!reply.value.answer.trim().is_empty());

    let metrics = service.metrics();
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.successes, 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn prediction_timeouts_exhaust_retries_then_fall_back() {
    let stub = StubTransport::always(StubReply::Timeout);
    let service = stub_service(PredictionAdapter, &stub, &fast_config());

    let reply = service.call(&StudentMetrics::default()).await;

    assert_eq!(stub.call_count(), 3);
    assert!(reply.degraded);
    assert_eq!(reply.value.category, PerformanceCategory::Average);
    assert_eq!(reply.value.score, 70.0);

    let metrics = service.metrics();
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.successes, 0);
    assert_eq!(metrics.cache_hits, 0);
}

#[tokio::test]
async fn degraded_results_are_never_cached() -> anyhow::Result<()> {
    let stub = StubTransport::sequence_then(
        vec![StubReply::Status(500, "boom")],
        answer_payload("Recovered answer."),
    );
    let mut config = fast_config();
    config.max_attempts = 1;
    let service = stub_service(TutorAdapter, &stub, &config);
    let request = TutorRequest::builder().question("What is osmosis?").build()?;

    let degraded = service.call(&request).await;
    assert!(degraded.degraded);
    assert_eq!(service.cached_entries(), 0);

    // The backend came back; the next call reaches it instead of
    // replaying the fallback.
    let recovered = service.call(&request).await;
    assert!(!recovered.degraded);
    assert_eq!(recovered.value.answer, "Recovered answer.");
    Ok(())
}

#[tokio::test]
async fn wire_payloads_match_the_backend_contracts() -> anyhow::Result<()> {
    let stub = StubTransport::sequence(vec![answer_payload("ok")]);
    let service = stub_service(TutorAdapter, &stub, &fast_config());
    let request = TutorRequest::builder()
        .question("What is osmosis?")
        .max_tokens(Some(256))
        .build()?;
    service.call(&request).await;

    let call = &stub.calls()[0];
    assert_eq!(call.path, "/api/chat");
    assert_eq!(call.body["question"], "What is osmosis?");
    assert_eq!(call.body["max_tokens"], 256);
    assert!(call.body["temperature"].is_number());

    let stub = StubTransport::sequence(vec![StubReply::Json(json!({
        "questions": [{"question": "Q?"}],
    }))]);
    let service = stub_service(QuizAdapter, &stub, &fast_config());
    let request = QuizRequest::builder()
        .topics(vec!["algebra".to_string()])
        .n_questions(3)
        .build()?;
    service.call(&request).await;

    let call = &stub.calls()[0];
    assert_eq!(call.path, "/api/generate-quiz");
    assert_eq!(call.body["topics"], json!(["algebra"]));
    assert_eq!(call.body["n_questions"], 3);
    assert_eq!(call.body["type"], "mcq");
    Ok(())
}

#[tokio::test]
async fn clear_cache_forces_a_refetch() -> anyhow::Result<()> {
    let stub = StubTransport::sequence(vec![
        answer_payload("First."),
        answer_payload("Second."),
    ]);
    let service = stub_service(TutorAdapter, &stub, &fast_config());
    let request = TutorRequest::builder().question("What is osmosis?").build()?;

    service.call(&request).await;
    assert_eq!(service.cached_entries(), 1);
    service.clear_cache();
    assert_eq!(service.cached_entries(), 0);

    service.call(&request).await;
    assert_eq!(stub.call_count(), 2);
    Ok(())
}
