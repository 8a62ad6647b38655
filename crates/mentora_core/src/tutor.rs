//! Tutoring (chat) domain types.

use serde::{Deserialize, Serialize};

/// A question for the tutoring backend.
///
/// # Examples
///
/// ```
/// use mentora_core::TutorRequest;
///
/// let request = TutorRequest::builder()
///     .question("What is photosynthesis?")
///     .context(Some("biology revision".to_string()))
///     .build()
///     .unwrap();
/// assert!(request.context.is_some());
///
/// // A blank question never reaches the wire.
/// assert!(TutorRequest::builder().question("   ").build().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(build_fn(validate = "TutorRequestBuilder::check"))]
pub struct TutorRequest {
    /// The question text; required and non-blank
    #[builder(setter(into))]
    pub question: String,
    /// Optional subject context to steer retrieval
    #[builder(default)]
    pub context: Option<String>,
    /// Response length cap forwarded to the backend
    #[builder(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature forwarded to the backend
    #[builder(default)]
    pub temperature: Option<f32>,
}

impl TutorRequest {
    /// Start building a tutor request.
    pub fn builder() -> TutorRequestBuilder {
        TutorRequestBuilder::default()
    }
}

impl TutorRequestBuilder {
    fn check(&self) -> Result<(), String> {
        if let Some(question) = &self.question
            && question.trim().is_empty()
        {
            return Err("question must not be blank".to_string());
        }
        Ok(())
    }
}

/// A source the tutoring backend grounded its answer in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
    /// Source kind, "video" or "website"
    pub kind: String,
    /// Source URL
    pub url: String,
}

/// A tutoring answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorReply {
    /// The answer text; non-blank by contract
    pub answer: String,
    /// First video source, when one was reported
    pub video_link: Option<String>,
    /// First website source, when one was reported
    pub website_link: Option<String>,
    /// Follow-up prompts derived from the answer content
    pub suggestions: Vec<String>,
    /// All sources as reported by the backend
    pub sources: Vec<SourceLink>,
}
