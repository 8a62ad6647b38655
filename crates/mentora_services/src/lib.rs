//! Resilient clients for the Mentora upstream backends.
//!
//! Wraps three unreliable, cold-start-prone HTTP services — performance
//! prediction, quiz generation, and tutoring — behind a single calling
//! convention: check the cache, pace the dispatch, retry transient
//! failures with backoff, validate the payload shape, and synthesize a
//! deterministic degraded reply when the backend is unusable. A call
//! through this crate never surfaces a transport error to business code;
//! the only failure signal is the `degraded` flag on
//! [`ServiceResponse`](mentora_core::ServiceResponse).
//!
//! The per-call pipeline lives in [`RemoteService`]; everything
//! backend-specific (wire shapes, cache keys, fallback content) lives in
//! the three [`ServiceAdapter`] implementations. [`ServiceHub`] bundles
//! one configured service per backend.

#![warn(missing_docs)]

mod config;
mod health;
mod hub;
mod metrics;
pub mod prediction;
pub mod quiz;
mod retry;
mod service;
mod transport;
pub mod tutor;
mod validate;

pub use config::{BackendConfig, ServicesConfig};
pub use health::HealthProbe;
pub use hub::ServiceHub;
pub use metrics::{MetricsCollector, ServiceMetrics};
pub use prediction::PredictionAdapter;
pub use quiz::{HintAdapter, QuizAdapter};
pub use retry::{CallOutcome, RetryPolicy};
pub use service::{RemoteService, ServiceAdapter};
pub use transport::{Dispatch, HttpTransport};
pub use tutor::TutorAdapter;
