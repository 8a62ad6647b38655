//! Quiz-generation domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Question difficulty accepted by the quiz-generation backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Introductory questions
    Easy,
    /// Standard questions
    #[default]
    Medium,
    /// Advanced questions
    Hard,
}

/// Question format accepted by the quiz-generation backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
    strum::EnumString,
)]
pub enum QuestionKind {
    /// Four-option multiple choice
    #[default]
    #[serde(rename = "mcq")]
    #[strum(serialize = "mcq")]
    MultipleChoice,
    /// Free-text short answer
    #[serde(rename = "short")]
    #[strum(serialize = "short")]
    ShortAnswer,
}

/// Lower bound on requested question count.
pub const MIN_QUESTIONS: usize = 1;
/// Upper bound on requested question count.
pub const MAX_QUESTIONS: usize = 10;

/// A quiz-generation request.
///
/// # Examples
///
/// ```
/// use mentora_core::{Difficulty, QuizRequest};
///
/// let request = QuizRequest::builder()
///     .topics(vec!["photosynthesis".to_string()])
///     .difficulty(Difficulty::Hard)
///     .n_questions(5)
///     .build()
///     .unwrap();
/// assert_eq!(request.n_questions, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(build_fn(validate = "QuizRequestBuilder::check"))]
pub struct QuizRequest {
    /// Subject topics to draw questions from
    pub topics: Vec<String>,
    /// Requested difficulty
    #[builder(default)]
    pub difficulty: Difficulty,
    /// Requested question count; dispatch clamps to 1..=10
    #[builder(default = "5")]
    pub n_questions: usize,
    /// Requested question format
    #[builder(default)]
    pub kind: QuestionKind,
    /// Whether per-question explanations are wanted
    #[builder(default = "true")]
    pub include_explanations: bool,
    /// Optional behavioral-personalization object forwarded verbatim
    #[builder(default)]
    pub behavior: Option<JsonValue>,
}

impl QuizRequest {
    /// Start building a quiz request.
    pub fn builder() -> QuizRequestBuilder {
        QuizRequestBuilder::default()
    }

    /// Requested count clamped to the backend's accepted range.
    pub fn clamped_count(&self) -> usize {
        self.n_questions.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
    }

    /// First topic, or a generic label when the list is empty.
    pub fn primary_topic(&self) -> &str {
        self.topics
            .first()
            .map(String::as_str)
            .unwrap_or("General Knowledge")
    }
}

impl QuizRequestBuilder {
    fn check(&self) -> Result<(), String> {
        if let Some(topics) = &self.topics
            && topics.iter().all(|t| t.trim().is_empty())
        {
            return Err("at least one non-blank topic is required".to_string());
        }
        Ok(())
    }
}

/// One selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option identifier (typically "A" through "D")
    pub id: String,
    /// Option text
    pub text: String,
}

/// One generated question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Stable question identifier
    pub id: String,
    /// Question text
    pub text: String,
    /// Answer options; empty for short-answer questions
    pub options: Vec<AnswerOption>,
    /// Identifier of the correct option, when disclosed
    pub correct_answer: Option<String>,
    /// Explanation of the correct answer, when requested
    pub explanation: Option<String>,
    /// Topic the question belongs to
    pub topic: Option<String>,
    /// Difficulty the question was generated at
    pub difficulty: Option<Difficulty>,
}

/// A generated quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Backend- or locally-assigned quiz identifier
    pub quiz_id: String,
    /// The generated questions, truncated to the requested count
    pub questions: Vec<QuizQuestion>,
    /// Length of `questions` after truncation
    pub total_questions: usize,
    /// Topic the quiz was generated for
    pub topic: String,
    /// Difficulty the quiz was generated at
    pub difficulty: Difficulty,
}

/// A hint request for one quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(build_fn(validate = "HintRequestBuilder::check"))]
pub struct HintRequest {
    /// The question the student is stuck on
    #[builder(setter(into))]
    pub question_text: String,
    /// Topic context for the hint
    #[builder(setter(into), default = "\"General Knowledge\".to_string()")]
    pub topic: String,
    /// Escalation level, 1 (gentle nudge) through 5 (near give-away)
    #[builder(default = "1")]
    pub level: u8,
    /// Optional behavioral-personalization object forwarded verbatim
    #[builder(default)]
    pub behavior: Option<JsonValue>,
}

impl HintRequest {
    /// Start building a hint request.
    pub fn builder() -> HintRequestBuilder {
        HintRequestBuilder::default()
    }

    /// Hint level clamped to the supported 1..=5 ladder.
    pub fn clamped_level(&self) -> u8 {
        self.level.clamp(1, 5)
    }
}

impl HintRequestBuilder {
    fn check(&self) -> Result<(), String> {
        if let Some(text) = &self.question_text
            && text.trim().is_empty()
        {
            return Err("question_text must not be blank".to_string());
        }
        Ok(())
    }
}

/// A generated hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    /// Hint text
    pub text: String,
    /// Escalation level the hint was produced for
    pub level: u8,
}
