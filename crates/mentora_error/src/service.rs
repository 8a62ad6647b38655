//! Remote-service failure taxonomy.
//!
//! Each failed attempt against an upstream backend is classified into one
//! of the kinds below. The classification decides whether the retry
//! executor keeps going (`is_retryable`) or fails fast and hands the call
//! to fallback synthesis.

/// Classification of a single failed backend attempt.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ServiceErrorKind {
    /// Request exceeded its deadline, commonly an idle backend cold start
    #[display("Request timed out after {}ms (possible cold start)", elapsed_ms)]
    Timeout {
        /// Time spent waiting before the deadline fired, in milliseconds
        elapsed_ms: u64,
    },
    /// Backend could not be reached at all (connection refused, DNS)
    #[display("Backend unreachable: {}", _0)]
    Unreachable(String),
    /// Backend answered HTTP 429
    #[display("Rate limited by backend: {}", _0)]
    RateLimited(String),
    /// Backend answered HTTP 5xx
    #[display("Server error {}: {}", status, message)]
    ServerError {
        /// HTTP status code (500..=599)
        status: u16,
        /// Response body or status text
        message: String,
    },
    /// Backend answered HTTP 4xx other than 429
    #[display("Client error {}: {}", status, message)]
    ClientError {
        /// HTTP status code (400..=499, excluding 429)
        status: u16,
        /// Response body or status text
        message: String,
    },
    /// Backend answered 200 but the payload failed structural validation
    #[display("Malformed response: {}", _0)]
    MalformedResponse(String),
}

impl ServiceErrorKind {
    /// Check if another attempt against the backend can plausibly succeed.
    ///
    /// Timeouts, connection failures, 5xx, and 429 are transient. Client
    /// errors and malformed payloads are not retried: a reachable server
    /// that rejects or garbles the request will do so again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceErrorKind::Timeout { .. }
                | ServiceErrorKind::Unreachable(_)
                | ServiceErrorKind::RateLimited(_)
                | ServiceErrorKind::ServerError { .. }
        )
    }

    /// Short stable label for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceErrorKind::Timeout { .. } => "timeout",
            ServiceErrorKind::Unreachable(_) => "unreachable",
            ServiceErrorKind::RateLimited(_) => "rate_limited",
            ServiceErrorKind::ServerError { .. } => "server_error",
            ServiceErrorKind::ClientError { .. } => "client_error",
            ServiceErrorKind::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Remote-service error with source location tracking.
///
/// # Examples
///
/// ```
/// use mentora_error::{Retryable, ServiceError, ServiceErrorKind};
///
/// let err = ServiceError::new(ServiceErrorKind::ServerError {
///     status: 503,
///     message: "service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = ServiceError::new(ServiceErrorKind::ClientError {
///     status: 400,
///     message: "bad payload".to_string(),
/// });
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Service Error: {} at line {} in {}", kind, line, file)]
pub struct ServiceError {
    /// The kind of failure that occurred
    pub kind: ServiceErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl ServiceError {
    /// Create a new service error at the caller's location.
    #[track_caller]
    pub fn new(kind: ServiceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ServiceErrorKind {
        &self.kind
    }
}

impl From<ServiceErrorKind> for ServiceError {
    #[track_caller]
    fn from(kind: ServiceErrorKind) -> Self {
        Self::new(kind)
    }
}

// Validation failures feed the retry classifier as fatal malformed payloads.
impl From<crate::ValidationError> for ServiceError {
    #[track_caller]
    fn from(err: crate::ValidationError) -> Self {
        Self::new(ServiceErrorKind::MalformedResponse(format!(
            "field `{}` {}",
            err.field, err.problem
        )))
    }
}

/// Errors that can report whether retrying is worthwhile.
///
/// Transient failures (5xx, 429, timeouts, refused connections) return
/// true. Permanent failures (4xx, structurally invalid payloads) return
/// false and must fail fast.
pub trait Retryable {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl Retryable for ServiceError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        let retryable = [
            ServiceErrorKind::Timeout { elapsed_ms: 30_000 },
            ServiceErrorKind::Unreachable("connection refused".into()),
            ServiceErrorKind::RateLimited("quota exhausted".into()),
            ServiceErrorKind::ServerError {
                status: 502,
                message: "bad gateway".into(),
            },
        ];
        for kind in retryable {
            assert!(kind.is_retryable(), "{kind} should be retryable");
        }

        let fatal = [
            ServiceErrorKind::ClientError {
                status: 404,
                message: "not found".into(),
            },
            ServiceErrorKind::MalformedResponse("blank answer".into()),
        ];
        for kind in fatal {
            assert!(!kind.is_retryable(), "{kind} should be fatal");
        }
    }

    #[test]
    fn labels_are_stable() {
        let kind = ServiceErrorKind::Timeout { elapsed_ms: 1 };
        assert_eq!(kind.label(), "timeout");
    }
}
