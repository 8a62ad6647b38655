//! Liveness-probe report types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one liveness probe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HealthState {
    /// Probe endpoint answered 200
    Healthy,
    /// Probe endpoint answered, but not with 200
    Unhealthy,
    /// Probe timed out, commonly a cold start in progress
    Timeout,
    /// Probe could not connect at all
    Unreachable,
}

/// A point-in-time health report for one backend.
///
/// Reports are created fresh on every probe and never cached; a stale
/// verdict on a cold-start-prone backend is worse than none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Probe outcome
    pub state: HealthState,
    /// When the probe ran
    pub checked_at: DateTime<Utc>,
    /// How long the probe took
    pub latency: Duration,
    /// Error text or status detail, when not healthy
    pub detail: Option<String>,
}

impl HealthReport {
    /// Create a report stamped with the current time.
    pub fn new(state: HealthState, latency: Duration, detail: Option<String>) -> Self {
        Self {
            state,
            checked_at: Utc::now(),
            latency,
            detail,
        }
    }

    /// Whether the backend answered its probe with 200.
    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }
}
