//! Generic resilient call pipeline.
//!
//! One [`RemoteService`] instance exists per backend operation. The
//! pipeline for a call is fixed: cache lookup → rate-limit wait → retried
//! HTTP attempt with validation → cache store on success, fallback
//! synthesis on failure — with exactly one metrics update per call,
//! matching the path taken.

use crate::config::BackendConfig;
use crate::health::HealthProbe;
use crate::metrics::{ExportedMetrics, MetricsCollector, ServiceMetrics};
use crate::retry::{self, CallOutcome, RetryPolicy};
use crate::transport::Dispatch;
use mentora_cache::{CacheKey, ResponseCache, ResponseCacheConfig};
use mentora_core::{HealthReport, ServiceResponse};
use mentora_error::{MentoraResult, ServiceError};
use mentora_rate_limit::RateLimiter;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Everything backend-specific about one operation.
///
/// Adapters are pure: they map a typed domain request into the backend's
/// wire payload, map (and structurally validate) the wire reply back into
/// a domain value, derive the semantic cache key, and synthesize the
/// degraded substitute. All transport, pacing, retry, and accounting
/// concerns stay in [`RemoteService`].
pub trait ServiceAdapter: Send + Sync {
    /// Typed domain request.
    type Request: Send + Sync;
    /// Typed domain reply.
    type Reply: Clone + Send + Sync;

    /// Stable service label for logs, metrics, and cache keys.
    fn service_name(&self) -> &'static str;

    /// POST path of the backend operation.
    fn endpoint(&self) -> &'static str;

    /// Cache key over the semantically relevant request fields only.
    fn cache_key(&self, request: &Self::Request) -> CacheKey;

    /// Map the domain request into the backend's wire payload.
    fn to_wire(&self, request: &Self::Request) -> MentoraResult<JsonValue>;

    /// Decode and structurally validate the backend's reply.
    ///
    /// Failures are fatal for the surrounding retry loop: a reachable
    /// server that violates its contract is reported, not retried.
    fn from_wire(
        &self,
        request: &Self::Request,
        payload: JsonValue,
    ) -> Result<Self::Reply, ServiceError>;

    /// Deterministic contract-shaped substitute for a dead backend.
    ///
    /// Pure computation over the request; must never touch the network
    /// and never fail.
    fn fallback(&self, request: &Self::Request) -> Self::Reply;
}

/// A resilient client for one backend operation.
///
/// Owns the operation's cache and retry policy; shares the backend's
/// rate limiter and metrics with any sibling operation on the same
/// backend. Calls never return an error — when the backend is unusable
/// the reply is synthesized locally and flagged `degraded`.
pub struct RemoteService<A: ServiceAdapter> {
    adapter: A,
    transport: Arc<dyn Dispatch>,
    probe: HealthProbe,
    cache: Mutex<ResponseCache<A::Reply>>,
    cache_ttl: Duration,
    limiter: Arc<RateLimiter>,
    metrics: Arc<MetricsCollector>,
    retry: RetryPolicy,
}

impl<A: ServiceAdapter> RemoteService<A> {
    /// Create a service sharing the backend's limiter and metrics.
    ///
    /// `transport` carries the business timeout; `probe_transport` the
    /// short health-check timeout. Operations that target the same
    /// backend must pass clones of the same `limiter` and `metrics` so
    /// pacing and accounting stay backend-wide.
    pub fn new(
        adapter: A,
        transport: Arc<dyn Dispatch>,
        probe_transport: Arc<dyn Dispatch>,
        config: &BackendConfig,
        limiter: Arc<RateLimiter>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            adapter,
            transport,
            probe: HealthProbe::new(probe_transport),
            cache: Mutex::new(ResponseCache::new(ResponseCacheConfig::default())),
            cache_ttl: config.cache_ttl(),
            limiter,
            metrics,
            retry: config.retry_policy(),
        }
    }

    /// Create a service with its own fresh limiter and metrics.
    pub fn from_config(
        adapter: A,
        transport: Arc<dyn Dispatch>,
        probe_transport: Arc<dyn Dispatch>,
        config: &BackendConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.min_interval()));
        let metrics = Arc::new(MetricsCollector::new());
        Self::new(adapter, transport, probe_transport, config, limiter, metrics)
    }

    /// Stable service label.
    pub fn service_name(&self) -> &'static str {
        self.adapter.service_name()
    }

    /// Drive one call through the full pipeline.
    #[instrument(skip(self, request), fields(service = self.adapter.service_name()))]
    pub async fn call(&self, request: &A::Request) -> ServiceResponse<A::Reply> {
        let name = self.adapter.service_name();
        let key = self.adapter.cache_key(request);

        // Lock covers only the map lookup, never the network.
        let cached = self.cache.lock().unwrap().get(&key);
        if let Some(hit) = cached {
            debug!(key = %key.short_hex(), "Serving cached reply");
            self.metrics.record_cache_hit();
            ExportedMetrics::get().record_cache_hit(name);
            return ServiceResponse::live(hit);
        }

        let wire = match self.adapter.to_wire(request) {
            Ok(wire) => wire,
            Err(err) => {
                warn!(error = %err, "Request marshalling failed, serving fallback");
                self.metrics.record_failure();
                ExportedMetrics::get().record_error(name, "marshalling");
                return ServiceResponse::degraded(
                    self.adapter.fallback(request),
                    format!("request marshalling failed: {err}"),
                );
            }
        };

        self.limiter.throttle().await;

        let endpoint = self.adapter.endpoint();
        let outcome = retry::execute(&self.retry, |attempt| {
            let wire = wire.clone();
            async move {
                debug!(attempt, endpoint, "Dispatching request");
                let payload = self.transport.post(endpoint, &wire).await?;
                self.adapter.from_wire(request, payload)
            }
        })
        .await;

        match outcome {
            CallOutcome::Success { result, latency } => {
                self.cache
                    .lock()
                    .unwrap()
                    .insert(key, result.clone(), Some(self.cache_ttl));
                self.metrics.record_success(latency);
                ExportedMetrics::get().record_request(name, latency.as_secs_f64());
                info!(
                    latency_ms = latency.as_millis() as u64,
                    "Backend call succeeded"
                );
                ServiceResponse::live(result)
            }
            CallOutcome::RetryableFailure { error, .. } => {
                warn!(error = %error, "Retries exhausted, serving fallback");
                self.metrics.record_failure();
                ExportedMetrics::get().record_error(name, error.kind().label());
                ServiceResponse::degraded(self.adapter.fallback(request), error.kind().to_string())
            }
            CallOutcome::FatalFailure { error, .. } => {
                warn!(error = %error, "Permanent failure, serving fallback");
                self.metrics.record_failure();
                ExportedMetrics::get().record_error(name, error.kind().label());
                ServiceResponse::degraded(self.adapter.fallback(request), error.kind().to_string())
            }
        }
    }

    /// Probe the backend's liveness endpoint.
    ///
    /// Independent of the business path: no cache, no pacing, no retry.
    pub async fn check_health(&self) -> HealthReport {
        self.probe.check().await
    }

    /// Snapshot this backend's call accounting.
    pub fn metrics(&self) -> ServiceMetrics {
        self.metrics.snapshot()
    }

    /// Drop every cached reply for this operation.
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    /// Number of currently cached replies.
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
