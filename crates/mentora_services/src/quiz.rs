//! Quiz-generation backend adapters.
//!
//! Two operations share this backend (and therefore its rate limiter and
//! metrics): `POST /api/generate-quiz` and `POST /api/generate-hint`.

use crate::service::ServiceAdapter;
use crate::validate;
use mentora_cache::CacheKey;
use mentora_core::{
    AnswerOption, Difficulty, Hint, HintRequest, QuestionKind, Quiz, QuizQuestion, QuizRequest,
};
use mentora_error::{MentoraResult, ServiceError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateQuizDto<'a> {
    context_refs: [&'a str; 0],
    topics: &'a [String],
    difficulty: String,
    n_questions: usize,
    #[serde(rename = "type")]
    kind: String,
    include_explanations: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_behavior: Option<&'a JsonValue>,
}

#[derive(Debug, Deserialize)]
struct QuizReplyDto {
    #[serde(default)]
    quiz_id: Option<String>,
    questions: Vec<QuestionDto>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    #[serde(default)]
    id: Option<String>,
    // Upstream has shipped the text under either key; accept both.
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    options: Vec<OptionDto>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OptionDto {
    id: String,
    text: String,
}

impl QuestionDto {
    fn text(&self) -> Option<&str> {
        self.question
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.text.as_deref().filter(|t| !t.trim().is_empty()))
    }
}

/// Adapter for quiz generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizAdapter;

impl ServiceAdapter for QuizAdapter {
    type Request = QuizRequest;
    type Reply = Quiz;

    fn service_name(&self) -> &'static str {
        "quiz"
    }

    fn endpoint(&self) -> &'static str {
        "/api/generate-quiz"
    }

    fn cache_key(&self, request: &Self::Request) -> CacheKey {
        // The personalization blob is deliberately left out: two students
        // asking for the same topic/difficulty/count share a quiz.
        let count = request.clamped_count().to_string();
        let difficulty = request.difficulty.to_string();
        let kind = request.kind.to_string();
        let mut parts: Vec<&str> = request.topics.iter().map(String::as_str).collect();
        parts.push(&difficulty);
        parts.push(&count);
        parts.push(&kind);
        CacheKey::new("quiz.generate", &parts)
    }

    fn to_wire(&self, request: &Self::Request) -> MentoraResult<JsonValue> {
        let dto = GenerateQuizDto {
            context_refs: [],
            topics: &request.topics,
            difficulty: request.difficulty.to_string(),
            n_questions: request.clamped_count(),
            kind: request.kind.to_string(),
            include_explanations: request.include_explanations,
            student_behavior: request.behavior.as_ref(),
        };
        serde_json::to_value(dto).map_err(|e| mentora_error::JsonError::new(e.to_string()).into())
    }

    fn from_wire(
        &self,
        request: &Self::Request,
        payload: JsonValue,
    ) -> Result<Self::Reply, ServiceError> {
        let dto: QuizReplyDto = validate::decode(payload)?;
        validate::non_empty("questions", &dto.questions)?;

        let requested = request.clamped_count();
        let received = dto.questions.len();

        let mut questions = Vec::with_capacity(requested.min(received));
        for (index, question) in dto.questions.into_iter().take(requested).enumerate() {
            let text = question
                .text()
                .ok_or_else(|| {
                    ValidationError::new(format!("questions[{index}].text"), "must not be blank")
                })?
                .to_string();

            questions.push(QuizQuestion {
                id: question.id.unwrap_or_else(|| format!("q{}", index + 1)),
                text,
                options: question
                    .options
                    .into_iter()
                    .map(|o| AnswerOption { id: o.id, text: o.text })
                    .collect(),
                correct_answer: question.correct_answer,
                explanation: question.explanation,
                topic: question.topic,
                difficulty: question.difficulty.and_then(|d| d.parse().ok()),
            });
        }

        if received > requested {
            debug!(received, requested, "Truncating surplus questions");
        }

        let total_questions = questions.len();
        Ok(Quiz {
            quiz_id: dto
                .quiz_id
                .unwrap_or_else(|| format!("quiz-{}", self.cache_key(request).short_hex())),
            questions,
            total_questions,
            topic: dto
                .topic
                .unwrap_or_else(|| request.primary_topic().to_string()),
            difficulty: dto
                .difficulty
                .and_then(|d| d.parse().ok())
                .unwrap_or(request.difficulty),
        })
    }

    fn fallback(&self, request: &Self::Request) -> Self::Reply {
        synthesize_quiz(request, &self.cache_key(request))
    }
}

// Template stems cycled through when synthesizing a practice quiz.
const TEMPLATE_STEMS: [&str; 5] = [
    "Which of the following best describes {topic}?",
    "Which statement about {topic} is accurate?",
    "What is a key concept to understand when studying {topic}?",
    "Which of these is most closely related to {topic}?",
    "What would help you check your understanding of {topic}?",
];

fn synthesize_quiz(request: &QuizRequest, key: &CacheKey) -> Quiz {
    let topic = request.primary_topic().to_string();
    let count = request.clamped_count();

    let questions = (0..count)
        .map(|index| {
            let stem = TEMPLATE_STEMS[index % TEMPLATE_STEMS.len()];
            let options = match request.kind {
                QuestionKind::MultipleChoice => vec![
                    AnswerOption {
                        id: "A".to_string(),
                        text: format!("A core principle of {topic}"),
                    },
                    AnswerOption {
                        id: "B".to_string(),
                        text: "A concept from an unrelated subject".to_string(),
                    },
                    AnswerOption {
                        id: "C".to_string(),
                        text: "A common misconception".to_string(),
                    },
                    AnswerOption {
                        id: "D".to_string(),
                        text: "None of the above".to_string(),
                    },
                ],
                QuestionKind::ShortAnswer => Vec::new(),
            };
            QuizQuestion {
                id: format!("fallback-{}-q{}", key.short_hex(), index + 1),
                text: stem.replace("{topic}", &topic),
                options,
                correct_answer: matches!(request.kind, QuestionKind::MultipleChoice)
                    .then(|| "A".to_string()),
                explanation: Some(format!(
                    "This question comes from the built-in practice bank for {topic}."
                )),
                topic: Some(topic.clone()),
                difficulty: Some(request.difficulty),
            }
        })
        .collect::<Vec<_>>();

    let total_questions = questions.len();
    Quiz {
        quiz_id: format!("fallback-{}", key.short_hex()),
        questions,
        total_questions,
        topic,
        difficulty: request.difficulty,
    }
}

#[derive(Debug, Serialize)]
struct GenerateHintDto<'a> {
    question_text: &'a str,
    current_topic: &'a str,
    hint_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    student_behavior: Option<&'a JsonValue>,
}

#[derive(Debug, Deserialize)]
struct HintReplyDto {
    hint: String,
}

/// Adapter for per-question hint generation.
///
/// Shares the quiz backend; construct its service with the quiz
/// backend's limiter and metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HintAdapter;

// The generic hint ladder served when the backend is unusable, from
// gentle nudge (1) to near give-away (5).
const FALLBACK_HINTS: [&str; 5] = [
    "Take your time to read the question carefully. What is it asking for?",
    "Break down the problem into smaller parts. Which part should you solve first?",
    "Think about similar problems you've solved before. What techniques did you use?",
    "Review the key terms and concepts in the question. How do they relate to each other?",
    "Consider all the information given. Have you used everything important?",
];

impl ServiceAdapter for HintAdapter {
    type Request = HintRequest;
    type Reply = Hint;

    fn service_name(&self) -> &'static str {
        "quiz"
    }

    fn endpoint(&self) -> &'static str {
        "/api/generate-hint"
    }

    fn cache_key(&self, request: &Self::Request) -> CacheKey {
        let level = request.clamped_level().to_string();
        CacheKey::new(
            "quiz.hint",
            &[&request.question_text, &request.topic, &level],
        )
    }

    fn to_wire(&self, request: &Self::Request) -> MentoraResult<JsonValue> {
        let dto = GenerateHintDto {
            question_text: &request.question_text,
            current_topic: &request.topic,
            hint_level: request.clamped_level(),
            student_behavior: request.behavior.as_ref(),
        };
        serde_json::to_value(dto).map_err(|e| mentora_error::JsonError::new(e.to_string()).into())
    }

    fn from_wire(
        &self,
        request: &Self::Request,
        payload: JsonValue,
    ) -> Result<Self::Reply, ServiceError> {
        let dto: HintReplyDto = validate::decode(payload)?;
        validate::non_blank("hint", &dto.hint)?;
        Ok(Hint {
            text: dto.hint,
            level: request.clamped_level(),
        })
    }

    fn fallback(&self, request: &Self::Request) -> Self::Reply {
        let level = request.clamped_level();
        Hint {
            text: FALLBACK_HINTS[(level - 1) as usize].to_string(),
            level,
        }
    }
}
