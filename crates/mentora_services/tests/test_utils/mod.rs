//! Shared test doubles for the service pipeline tests.
//!
//! `StubTransport` stands in for the HTTP transport: it replays a script
//! of canned replies and records every dispatch with a timestamp, so
//! tests can assert call counts, spacing, and payloads without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use mentora_error::{ServiceError, ServiceErrorKind};
use mentora_services::{BackendConfig, Dispatch, RemoteService, ServiceAdapter};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One scripted transport reaction.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// 200 with the given JSON body
    Json(JsonValue),
    /// Non-2xx status with the given body text
    Status(u16, &'static str),
    /// Attempt deadline fired
    Timeout,
    /// Connection refused
    Refused,
}

impl StubReply {
    fn into_result(self) -> Result<JsonValue, ServiceError> {
        match self {
            StubReply::Json(body) => Ok(body),
            StubReply::Status(status, body) => {
                let kind = if status == 429 {
                    ServiceErrorKind::RateLimited(body.to_string())
                } else if (500..600).contains(&status) {
                    ServiceErrorKind::ServerError {
                        status,
                        message: body.to_string(),
                    }
                } else {
                    ServiceErrorKind::ClientError {
                        status,
                        message: body.to_string(),
                    }
                };
                Err(ServiceError::new(kind))
            }
            StubReply::Timeout => Err(ServiceError::new(ServiceErrorKind::Timeout {
                elapsed_ms: 30_000,
            })),
            StubReply::Refused => Err(ServiceError::new(ServiceErrorKind::Unreachable(
                "connection refused".to_string(),
            ))),
        }
    }
}

/// One recorded dispatch.
#[derive(Debug, Clone)]
pub struct StubCall {
    pub path: String,
    pub body: JsonValue,
    pub at: Instant,
}

/// Scripted transport double.
pub struct StubTransport {
    script: Mutex<VecDeque<StubReply>>,
    repeat: Option<StubReply>,
    calls: Mutex<Vec<StubCall>>,
}

impl StubTransport {
    /// Answer every dispatch with the same reply.
    pub fn always(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(reply),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Replay `replies` in order, then panic on extra dispatches.
    pub fn sequence(replies: Vec<StubReply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            repeat: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Replay `replies` in order, then keep answering with `fallback`.
    pub fn sequence_then(replies: Vec<StubReply>, fallback: StubReply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
            repeat: Some(fallback),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self, path: &str) -> StubReply {
        let scripted = self.script.lock().unwrap().pop_front();
        scripted
            .or_else(|| self.repeat.clone())
            .unwrap_or_else(|| panic!("stub script exhausted for {path}"))
    }

    fn record(&self, path: &str, body: JsonValue) {
        self.calls.lock().unwrap().push(StubCall {
            path: path.to_string(),
            body,
            at: Instant::now(),
        });
    }
}

#[async_trait]
impl Dispatch for StubTransport {
    async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue, ServiceError> {
        self.record(path, body.clone());
        self.next_reply(path).into_result()
    }

    async fn get(&self, path: &str) -> Result<JsonValue, ServiceError> {
        self.record(path, JsonValue::Null);
        self.next_reply(path).into_result()
    }
}

/// Backend config tuned for tests: no pacing, no jitter, tiny backoff.
pub fn fast_config() -> BackendConfig {
    BackendConfig {
        base_url: "http://stub.invalid".to_string(),
        cache_ttl_secs: 60,
        min_interval_ms: 0,
        max_attempts: 3,
        base_delay_ms: 10,
        backoff_multiplier: 2.0,
        jitter: false,
        ..BackendConfig::default()
    }
}

/// Wire an adapter to a stub transport (business and probe paths alike).
pub fn stub_service<A: ServiceAdapter>(
    adapter: A,
    stub: &Arc<StubTransport>,
    config: &BackendConfig,
) -> RemoteService<A> {
    let transport: Arc<dyn Dispatch> = stub.clone();
    let probe: Arc<dyn Dispatch> = stub.clone();
    RemoteService::from_config(adapter, transport, probe, config)
}
