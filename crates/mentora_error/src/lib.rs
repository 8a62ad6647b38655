//! Error types for the Mentora remote-service client.
//!
//! Every error carries the source location where it was created
//! (captured with `#[track_caller]`), so a log line is enough to find
//! the failing call site without a backtrace.

#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod http;
mod json;
mod service;
mod validation;

pub use builder::BuilderError;
pub use config::ConfigError;
pub use error::{MentoraError, MentoraErrorKind, MentoraResult};
pub use http::HttpError;
pub use json::JsonError;
pub use service::{Retryable, ServiceError, ServiceErrorKind};
pub use validation::ValidationError;
