//! The degraded-result wrapper returned for every backend call.

use serde::{Deserialize, Serialize};

/// A contract-shaped result plus its provenance.
///
/// Callers always receive a usable value. When the backend was unusable
/// the value is locally synthesized, `degraded` is set, and `reason`
/// explains why — that flag is the only failure signal that crosses this
/// layer's boundary.
///
/// # Examples
///
/// ```
/// use mentora_core::ServiceResponse;
///
/// let fresh = ServiceResponse::live(42);
/// assert!(!fresh.degraded);
///
/// let substitute = ServiceResponse::degraded(0, "backend unreachable");
/// assert!(substitute.degraded);
/// assert_eq!(substitute.reason.as_deref(), Some("backend unreachable"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// The domain value, genuine or synthesized
    pub value: T,
    /// True when the value was synthesized locally
    pub degraded: bool,
    /// Why the backend was unusable, when degraded
    pub reason: Option<String>,
}

impl<T> ServiceResponse<T> {
    /// Wrap a genuine backend result.
    pub fn live(value: T) -> Self {
        Self {
            value,
            degraded: false,
            reason: None,
        }
    }

    /// Wrap a locally synthesized substitute.
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            degraded: true,
            reason: Some(reason.into()),
        }
    }

    /// Consume the wrapper, discarding provenance.
    pub fn into_value(self) -> T {
        self.value
    }
}
