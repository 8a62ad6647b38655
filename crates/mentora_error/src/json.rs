//! JSON serialization error type.

/// JSON encode/decode error with source location.
///
/// Used when marshalling a domain request into its wire payload fails.
/// Decode failures on backend responses are classified as
/// [`ServiceErrorKind::MalformedResponse`](crate::ServiceErrorKind)
/// instead, because they feed the retry classifier.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use mentora_error::JsonError;
    ///
    /// let err = JsonError::new("key must be a string");
    /// assert!(format!("{}", err).contains("JSON Error"));
    /// ```
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
