//! HTTP transport error type.

/// Transport-level HTTP error with source location.
///
/// Wraps reqwest failures that are not yet classified into the service
/// taxonomy (client construction, URL building).
///
/// # Examples
///
/// ```
/// use mentora_error::HttpError;
///
/// let err = HttpError::new("failed to build client");
/// assert!(err.message.contains("build client"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
