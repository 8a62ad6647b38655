// Accounting invariant: every call lands in exactly one outcome bucket,
// including under concurrency.

mod test_utils;

use mentora_core::TutorRequest;
use mentora_services::TutorAdapter;
use serde_json::json;
use std::sync::Arc;
use test_utils::{StubReply, StubTransport, fast_config, stub_service};

fn ok_payload() -> StubReply {
    StubReply::Json(json!({"answer": "An answer.", "sources": []}))
}

fn ask(text: &str) -> TutorRequest {
    TutorRequest::builder().question(text).build().unwrap()
}

#[tokio::test]
async fn mixed_outcomes_balance_the_ledger() {
    let stub = StubTransport::sequence_then(
        vec![ok_payload(), ok_payload(), StubReply::Status(400, "nope")],
        ok_payload(),
    );
    let service = stub_service(TutorAdapter, &stub, &fast_config());

    service.call(&ask("First question?")).await; // success
    service.call(&ask("Second question?")).await; // success
    service.call(&ask("Third question?")).await; // failure (400)
    service.call(&ask("First question?")).await; // cache hit
    service.call(&ask("Second question?")).await; // cache hit

    let metrics = service.metrics();
    assert_eq!(metrics.successes, 2);
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.cache_hits, 2);
    assert_eq!(metrics.total_requests, 5);
    assert_eq!(
        metrics.total_requests,
        metrics.successes + metrics.failures + metrics.cache_hits
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn the_ledger_balances_under_concurrency() {
    let stub = StubTransport::always(ok_payload());
    let service = Arc::new(stub_service(TutorAdapter, &stub, &fast_config()));

    // Warm three distinct entries.
    for i in 0..3 {
        service.call(&ask(&format!("Warm question {i}?"))).await;
    }

    // Hammer the warm entries concurrently; all of these hit cache.
    let mut handles = Vec::new();
    for _ in 0..4 {
        for i in 0..3 {
            let service = Arc::clone(&service);
            let request = ask(&format!("Warm question {i}?"));
            handles.push(tokio::spawn(async move { service.call(&request).await }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let metrics = service.metrics();
    assert_eq!(metrics.successes, 3);
    assert_eq!(metrics.cache_hits, 12);
    assert_eq!(metrics.failures, 0);
    assert_eq!(
        metrics.total_requests,
        metrics.successes + metrics.failures + metrics.cache_hits
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_balance_under_concurrency() {
    let stub = StubTransport::always(StubReply::Refused);
    let mut config = fast_config();
    config.max_attempts = 1;
    let service = Arc::new(stub_service(TutorAdapter, &stub, &config));

    let mut handles = Vec::new();
    for i in 0..5 {
        let service = Arc::clone(&service);
        let request = ask(&format!("Doomed question {i}?"));
        handles.push(tokio::spawn(async move { service.call(&request).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().degraded);
    }

    let metrics = service.metrics();
    assert_eq!(metrics.failures, 5);
    assert_eq!(metrics.total_requests, 5);
}

#[tokio::test]
async fn average_latency_only_tracks_successes() {
    let stub = StubTransport::sequence_then(
        vec![ok_payload()],
        StubReply::Status(500, "down"),
    );
    let mut config = fast_config();
    config.max_attempts = 1;
    let service = stub_service(TutorAdapter, &stub, &config);

    service.call(&ask("Good question?")).await;
    let after_success = service.metrics().avg_latency;
    service.call(&ask("Bad question?")).await;

    assert_eq!(service.metrics().avg_latency, after_success);
}
