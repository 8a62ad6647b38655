//! Performance-prediction domain types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Behavioral metrics extracted from one quiz attempt.
///
/// These are the nine numeric features the prediction backend scores.
/// The four confidence-affect fields are normalized shares and must sum
/// to roughly 1.0 on the wire; [`StudentMetrics::normalized`] rescales
/// them before dispatch.
///
/// # Examples
///
/// ```
/// use mentora_core::StudentMetrics;
///
/// let metrics = StudentMetrics::builder()
///     .hint_count(2.0)
///     .attempt_count(8.0)
///     .build()
///     .unwrap();
/// assert_eq!(metrics.hint_count, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(default)]
pub struct StudentMetrics {
    /// Number of hints the student requested
    pub hint_count: f64,
    /// 1.0 if the lowest-tier (give-away) hint was reached, else 0.0
    pub bottom_hint: f64,
    /// Number of answer attempts made
    pub attempt_count: f64,
    /// Milliseconds until the first response
    pub ms_first_response: f64,
    /// Total attempt duration in milliseconds
    pub duration: f64,
    /// Share of time the student appeared frustrated
    pub avg_conf_frustrated: f64,
    /// Share of time the student appeared confused
    pub avg_conf_confused: f64,
    /// Share of time the student appeared concentrated
    pub avg_conf_concentrating: f64,
    /// Share of time the student appeared bored
    pub avg_conf_bored: f64,
}

impl Default for StudentMetrics {
    fn default() -> Self {
        Self {
            hint_count: 0.0,
            bottom_hint: 0.0,
            attempt_count: 5.0,
            ms_first_response: 5_000.0,
            duration: 300_000.0,
            avg_conf_frustrated: 0.2,
            avg_conf_confused: 0.3,
            avg_conf_concentrating: 0.4,
            avg_conf_bored: 0.1,
        }
    }
}

impl StudentMetrics {
    /// Start building a metrics record; unset fields take neutral defaults.
    pub fn builder() -> StudentMetricsBuilder {
        StudentMetricsBuilder::default()
    }

    /// Rescale the four confidence-affect fields so they sum to 1.0.
    ///
    /// A zero or non-finite sum falls back to an even 0.25 split rather
    /// than producing NaN on the wire.
    pub fn normalized(mut self) -> Self {
        let total = self.avg_conf_frustrated
            + self.avg_conf_confused
            + self.avg_conf_concentrating
            + self.avg_conf_bored;
        if total > 0.0 && total.is_finite() {
            self.avg_conf_frustrated /= total;
            self.avg_conf_confused /= total;
            self.avg_conf_concentrating /= total;
            self.avg_conf_bored /= total;
        } else {
            self.avg_conf_frustrated = 0.25;
            self.avg_conf_confused = 0.25;
            self.avg_conf_concentrating = 0.25;
            self.avg_conf_bored = 0.25;
        }
        self
    }
}

/// Performance bucket assigned by the prediction backend.
///
/// Unrecognized labels are preserved verbatim in `Other` instead of
/// failing the call; the backend's label vocabulary has drifted before.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PerformanceCategory {
    /// Score ≥ 85
    Excellent,
    /// Score 70–84
    Good,
    /// Mid-range score
    Average,
    /// Score 40–59
    Struggling,
    /// Score < 40
    NeedsHelp,
    /// Label used by older model versions for high scorers
    Advanced,
    /// Any label outside the known vocabulary
    #[strum(default)]
    Other(String),
}

impl Serialize for PerformanceCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PerformanceCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(label
            .parse()
            .unwrap_or_else(|_| PerformanceCategory::Other(label.clone())))
    }
}

/// Prediction returned for one set of student metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Performance bucket
    pub category: PerformanceCategory,
    /// Predicted score on a 0–100 scale
    pub score: f64,
    /// Model confidence in the prediction, when reported
    pub confidence: Option<f64>,
    /// Learner-profile sub-object, passed through as reported
    pub learner_profile: Option<JsonValue>,
    /// Behavioral-analysis sub-object, passed through as reported
    pub behavior: Option<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_rescales_to_unit_sum() {
        let metrics = StudentMetrics::builder()
            .avg_conf_frustrated(0.4)
            .avg_conf_confused(0.4)
            .avg_conf_concentrating(0.8)
            .avg_conf_bored(0.4)
            .build()
            .unwrap()
            .normalized();
        let sum = metrics.avg_conf_frustrated
            + metrics.avg_conf_confused
            + metrics.avg_conf_concentrating
            + metrics.avg_conf_bored;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalization_survives_zero_sum() {
        let metrics = StudentMetrics::builder()
            .avg_conf_frustrated(0.0)
            .avg_conf_confused(0.0)
            .avg_conf_concentrating(0.0)
            .avg_conf_bored(0.0)
            .build()
            .unwrap()
            .normalized();
        assert_eq!(metrics.avg_conf_concentrating, 0.25);
    }

    #[test]
    fn unknown_category_label_is_preserved() {
        let parsed: PerformanceCategory = "prodigy".parse().unwrap();
        assert_eq!(parsed, PerformanceCategory::Other("prodigy".to_string()));
        assert_eq!(parsed.to_string(), "prodigy");
    }

    #[test]
    fn known_category_labels_parse_case_insensitively() {
        let parsed: PerformanceCategory = "Needs_Help".parse().unwrap();
        assert_eq!(parsed, PerformanceCategory::NeedsHelp);
    }
}
