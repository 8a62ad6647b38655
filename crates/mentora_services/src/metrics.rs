//! Per-backend call accounting.
//!
//! Two layers, both fed by the orchestrator: a process-local
//! [`MetricsCollector`] whose snapshot backs the maintenance API, and an
//! OpenTelemetry counter mirror for export, labelled by service name.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use serde::Serialize;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

/// Point-in-time view of one backend's call accounting.
///
/// Every call lands in exactly one of the three outcome counters, so
/// `total_requests == successes + failures + cache_hits` holds at every
/// observation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServiceMetrics {
    /// All calls observed
    pub total_requests: u64,
    /// Calls answered by the backend
    pub successes: u64,
    /// Calls that ended in fallback synthesis
    pub failures: u64,
    /// Calls answered from cache without touching the network
    pub cache_hits: u64,
    /// Incremental mean latency of successful backend calls
    pub avg_latency: Duration,
}

#[derive(Debug, Default)]
struct MetricsInner {
    successes: u64,
    failures: u64,
    cache_hits: u64,
    avg_latency_secs: f64,
}

/// Thread-safe counters for one backend.
///
/// The lock wraps only the counter update itself — never any network
/// wait — so a slow backend call cannot block unrelated accounting.
///
/// # Examples
///
/// ```
/// use mentora_services::MetricsCollector;
/// use std::time::Duration;
///
/// let metrics = MetricsCollector::new();
/// metrics.record_success(Duration::from_millis(120));
/// metrics.record_cache_hit();
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.total_requests, 2);
/// assert_eq!(snapshot.successes, 1);
/// assert_eq!(snapshot.cache_hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: Mutex<MetricsInner>,
}

impl MetricsCollector {
    /// Create a collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call the backend answered.
    ///
    /// The mean updates incrementally (`avg += (x - avg) / n`), so no
    /// per-call history accumulates.
    pub fn record_success(&self, latency: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.successes += 1;
        let n = inner.successes as f64;
        inner.avg_latency_secs += (latency.as_secs_f64() - inner.avg_latency_secs) / n;
    }

    /// Record a call that ended in fallback synthesis.
    pub fn record_failure(&self) {
        self.inner.lock().unwrap().failures += 1;
    }

    /// Record a call served from cache.
    pub fn record_cache_hit(&self) {
        self.inner.lock().unwrap().cache_hits += 1;
    }

    /// Consistent snapshot of all counters.
    pub fn snapshot(&self) -> ServiceMetrics {
        let inner = self.inner.lock().unwrap();
        ServiceMetrics {
            total_requests: inner.successes + inner.failures + inner.cache_hits,
            successes: inner.successes,
            failures: inner.failures,
            cache_hits: inner.cache_hits,
            avg_latency: Duration::from_secs_f64(inner.avg_latency_secs),
        }
    }
}

static EXPORTED: OnceLock<ExportedMetrics> = OnceLock::new();

/// OpenTelemetry mirror of the call accounting, labelled by service.
///
/// Instruments are no-ops until the host installs a meter provider.
#[derive(Clone)]
pub(crate) struct ExportedMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Total backend requests
    pub requests: Counter<u64>,
    /// Requests that ended in fallback synthesis
    pub errors: Counter<u64>,
    /// Requests served from cache
    pub cache_hits: Counter<u64>,
    /// Backend call duration in seconds
    pub duration: Histogram<f64>,
}

impl ExportedMetrics {
    fn init() -> Self {
        let meter = global::meter("mentora_services");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("backend.requests")
                .with_description("Total backend requests")
                .build(),
            errors: meter
                .u64_counter("backend.errors")
                .with_description("Backend requests that ended in fallback")
                .build(),
            cache_hits: meter
                .u64_counter("backend.cache_hits")
                .with_description("Backend requests served from cache")
                .build(),
            duration: meter
                .f64_histogram("backend.duration")
                .with_unit("seconds")
                .with_description("Backend call duration")
                .build(),
        }
    }

    /// Get the global exported-metrics instance.
    pub fn get() -> &'static Self {
        EXPORTED.get_or_init(Self::init)
    }

    /// Record a successful backend request.
    pub fn record_request(&self, service: &str, duration_secs: f64) {
        let labels = &[KeyValue::new("service", service.to_string())];
        self.requests.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Record a backend request that ended in fallback.
    pub fn record_error(&self, service: &str, error_type: &str) {
        let labels = &[
            KeyValue::new("service", service.to_string()),
            KeyValue::new("error_type", error_type.to_string()),
        ];
        self.requests.add(1, labels);
        self.errors.add(1, labels);
    }

    /// Record a backend request served from cache.
    pub fn record_cache_hit(&self, service: &str) {
        let labels = &[KeyValue::new("service", service.to_string())];
        self.requests.add(1, labels);
        self.cache_hits.add(1, labels);
    }
}
