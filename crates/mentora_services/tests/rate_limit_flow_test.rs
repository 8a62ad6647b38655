// Dispatch pacing through the full pipeline.

mod test_utils;

use mentora_core::TutorRequest;
use mentora_services::TutorAdapter;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{StubReply, StubTransport, fast_config, stub_service};

fn ok_payload() -> StubReply {
    StubReply::Json(json!({"answer": "An answer.", "sources": []}))
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_are_spaced_by_min_interval() {
    let stub = StubTransport::always(ok_payload());
    let mut config = fast_config();
    config.min_interval_ms = 100;
    let service = Arc::new(stub_service(TutorAdapter, &stub, &config));

    let mut handles = Vec::new();
    for i in 0..4 {
        let service = Arc::clone(&service);
        let request = TutorRequest::builder()
            .question(format!("Question number {i}?"))
            .build()
            .unwrap();
        handles.push(tokio::spawn(async move { service.call(&request).await }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().degraded);
    }

    let mut stamps: Vec<_> = stub.calls().into_iter().map(|c| c.at).collect();
    stamps.sort();
    assert_eq!(stamps.len(), 4);
    for pair in stamps.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(100));
    }
}

#[tokio::test(start_paused = true)]
async fn cache_hits_skip_the_rate_limiter() {
    let stub = StubTransport::sequence(vec![ok_payload()]);
    let mut config = fast_config();
    config.min_interval_ms = 60_000;
    let service = stub_service(TutorAdapter, &stub, &config);
    let request = TutorRequest::builder()
        .question("What is torque?")
        .build()
        .unwrap();

    service.call(&request).await;
    let before = tokio::time::Instant::now();
    let cached = service.call(&request).await;

    // No waiting on the gate: the cached reply returned instantly.
    assert_eq!(tokio::time::Instant::now(), before);
    assert!(!cached.degraded);
    assert_eq!(stub.call_count(), 1);
}
