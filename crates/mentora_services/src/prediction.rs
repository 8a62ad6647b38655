//! Performance-prediction backend adapter.
//!
//! `POST /predict` takes the nine numeric metrics of one quiz attempt
//! and returns a nested prediction (category label + score) with
//! optional behavioral and learner-profile sub-objects.

use crate::service::ServiceAdapter;
use crate::validate;
use mentora_cache::CacheKey;
use mentora_core::{PerformanceCategory, Prediction, StudentMetrics};
use mentora_error::{MentoraResult, ServiceError};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

#[derive(Debug, Deserialize)]
struct PredictReplyDto {
    prediction: PredictionBlockDto,
    #[serde(default)]
    behavior: Option<JsonValue>,
    #[serde(default)]
    learner_profile: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct PredictionBlockDto {
    category: String,
    score: f64,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Adapter for the performance-prediction backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionAdapter;

impl ServiceAdapter for PredictionAdapter {
    type Request = StudentMetrics;
    type Reply = Prediction;

    fn service_name(&self) -> &'static str {
        "prediction"
    }

    fn endpoint(&self) -> &'static str {
        "/predict"
    }

    fn cache_key(&self, request: &Self::Request) -> CacheKey {
        // Key over the normalized wire values so pre- and post-normalized
        // forms of the same attempt share a slot.
        let m = request.clone().normalized();
        let parts = [
            format!("{:.6}", m.hint_count),
            format!("{:.6}", m.bottom_hint),
            format!("{:.6}", m.attempt_count),
            format!("{:.6}", m.ms_first_response),
            format!("{:.6}", m.duration),
            format!("{:.6}", m.avg_conf_frustrated),
            format!("{:.6}", m.avg_conf_confused),
            format!("{:.6}", m.avg_conf_concentrating),
            format!("{:.6}", m.avg_conf_bored),
        ];
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        CacheKey::new("prediction.predict", &refs)
    }

    fn to_wire(&self, request: &Self::Request) -> MentoraResult<JsonValue> {
        let normalized = request.clone().normalized();
        serde_json::to_value(normalized)
            .map_err(|e| mentora_error::JsonError::new(e.to_string()).into())
    }

    fn from_wire(
        &self,
        _request: &Self::Request,
        payload: JsonValue,
    ) -> Result<Self::Reply, ServiceError> {
        let dto: PredictReplyDto = validate::decode(payload)?;
        validate::non_blank("prediction.category", &dto.prediction.category)?;

        let category = dto
            .prediction
            .category
            .parse()
            .unwrap_or(PerformanceCategory::Other(dto.prediction.category.clone()));

        Ok(Prediction {
            category,
            score: dto.prediction.score,
            confidence: dto.prediction.confidence,
            learner_profile: dto.learner_profile,
            behavior: dto.behavior,
        })
    }

    fn fallback(&self, _request: &Self::Request) -> Self::Reply {
        // Mirrors the neutral default the in-process predictor used when
        // its model file was missing.
        Prediction {
            category: PerformanceCategory::Average,
            score: 70.0,
            confidence: Some(0.5),
            learner_profile: Some(json!({
                "support_needed": "medium",
                "learning_pace": "moderate",
                "problem_solving": "average",
            })),
            behavior: None,
        }
    }
}
