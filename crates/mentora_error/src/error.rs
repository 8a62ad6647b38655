//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, HttpError, JsonError, ServiceError, ValidationError};

/// Union of the error kinds produced across the Mentora workspace.
///
/// # Examples
///
/// ```
/// use mentora_error::{HttpError, MentoraError};
///
/// let http_err = HttpError::new("connection reset");
/// let err: MentoraError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum MentoraErrorKind {
    /// HTTP transport error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Classified remote-service failure
    #[from(ServiceError)]
    Service(ServiceError),
    /// Structural payload validation failure
    #[from(ValidationError)]
    Validation(ValidationError),
}

/// Mentora error with kind discrimination.
///
/// Boxed so that `MentoraResult<T>` stays a single word wide regardless
/// of how large an individual kind grows.
///
/// # Examples
///
/// ```
/// use mentora_error::{ConfigError, MentoraResult};
///
/// fn might_fail() -> MentoraResult<()> {
///     Err(ConfigError::new("unreadable file"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Mentora Error: {}", _0)]
pub struct MentoraError(Box<MentoraErrorKind>);

impl MentoraError {
    /// Create a new error from a kind.
    pub fn new(kind: MentoraErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MentoraErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to MentoraErrorKind
impl<T> From<T> for MentoraError
where
    T: Into<MentoraErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Mentora operations.
pub type MentoraResult<T> = std::result::Result<T, MentoraError>;
