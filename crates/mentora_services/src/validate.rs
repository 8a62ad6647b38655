//! Structural payload validation helpers.
//!
//! Shared by the adapters' `from_wire` implementations. Checks are
//! structural only — required keys, primitive shapes, non-emptiness where
//! the contract demands it — never domain plausibility.

use mentora_error::{ServiceError, ServiceErrorKind, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::warn;

/// Decode a backend payload into a wire DTO.
///
/// A missing required key or a value of the wrong shape surfaces as a
/// fatal [`ServiceErrorKind::MalformedResponse`]; a reachable server that
/// garbles its contract is reported, not retried.
pub fn decode<T: DeserializeOwned>(payload: JsonValue) -> Result<T, ServiceError> {
    serde_json::from_value(payload).map_err(|e| {
        warn!(error = %e, "Payload failed structural decode");
        ServiceError::new(ServiceErrorKind::MalformedResponse(e.to_string()))
    })
}

/// Require a semantically non-empty string.
pub fn non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

/// Require a non-empty list.
pub fn non_empty<T>(field: &str, items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Sample {
        answer: String,
    }

    #[test]
    fn decode_rejects_missing_keys() {
        let result: Result<Sample, _> = decode(json!({"unrelated": 1}));
        let err = result.unwrap_err();
        assert!(matches!(
            err.kind(),
            ServiceErrorKind::MalformedResponse(_)
        ));
        assert!(!err.kind().is_retryable());
    }

    #[test]
    fn decode_accepts_extra_keys() {
        let result: Result<Sample, _> =
            decode(json!({"answer": "photosynthesis", "extra": true}));
        assert_eq!(result.unwrap().answer, "photosynthesis");
    }

    #[test]
    fn blank_strings_fail_validation() {
        assert!(non_blank("answer", "  \n ").is_err());
        assert!(non_blank("answer", "ok").is_ok());
    }

    #[test]
    fn empty_lists_fail_validation() {
        let none: [u8; 0] = [];
        assert!(non_empty("questions", &none).is_err());
        assert!(non_empty("questions", &[1]).is_ok());
    }
}
