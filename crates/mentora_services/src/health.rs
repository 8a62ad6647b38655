//! Out-of-band liveness probing.

use crate::transport::Dispatch;
use mentora_core::{HealthReport, HealthState};
use mentora_error::ServiceErrorKind;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Liveness probe for one backend.
///
/// Runs on its own transport with its own short timeout and never touches
/// the cache, the rate limiter, or the retry executor — a saturated
/// business path must not make the backend look unhealthy, and a probe
/// must not consume the business path's dispatch slots.
pub struct HealthProbe {
    transport: Arc<dyn Dispatch>,
    path: String,
}

impl HealthProbe {
    /// Probe the conventional `/health` endpoint.
    pub fn new(transport: Arc<dyn Dispatch>) -> Self {
        Self::with_path(transport, "/health")
    }

    /// Probe a custom liveness path.
    pub fn with_path(transport: Arc<dyn Dispatch>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    /// Run one probe and report what happened.
    ///
    /// Never fails: transport errors map onto the report's state. Each
    /// report is created fresh; probes are never cached.
    #[instrument(skip(self))]
    pub async fn check(&self) -> HealthReport {
        let started = Instant::now();
        let result = self.transport.get(&self.path).await;
        let latency = started.elapsed();

        let report = match result {
            Ok(_) => HealthReport::new(HealthState::Healthy, latency, None),
            Err(err) => {
                let state = match err.kind() {
                    ServiceErrorKind::Timeout { .. } => HealthState::Timeout,
                    ServiceErrorKind::Unreachable(_) => HealthState::Unreachable,
                    _ => HealthState::Unhealthy,
                };
                HealthReport::new(state, latency, Some(err.kind().to_string()))
            }
        };

        debug!(state = %report.state, latency_ms = latency.as_millis() as u64, "Probe finished");
        report
    }
}
