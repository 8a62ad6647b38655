//! Core data types for the Mentora remote-service client.
//!
//! Domain requests and replies for the three wrapped backends
//! (performance prediction, quiz generation, tutoring), the degraded-result
//! wrapper every call returns, and health-report types.

#![warn(missing_docs)]

mod health;
mod prediction;
mod quiz;
mod response;
pub mod telemetry;
mod tutor;

pub use health::{HealthReport, HealthState};
pub use prediction::{PerformanceCategory, Prediction, StudentMetrics, StudentMetricsBuilder};
pub use quiz::{
    AnswerOption, Difficulty, Hint, HintRequest, HintRequestBuilder, QuestionKind, Quiz,
    QuizQuestion, QuizRequest, QuizRequestBuilder,
};
pub use response::ServiceResponse;
pub use tutor::{SourceLink, TutorReply, TutorRequest, TutorRequestBuilder};
