use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ranking::mapper::{BucketTable, BUDGET, DURATION};
use crate::ranking::normalizer::NormalizerMode;
use crate::ranking::policy::ScoringPolicy;

/// One relocation lead as submitted by the preferences form.
///
/// Bucket and preference fields are kept as raw JSON so that unmapped or
/// mistyped values can fall back to their documented defaults instead of
/// rejecting the whole batch. Identity fields are passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadRecord {
    pub income: Option<Value>,
    pub budget: Option<Value>,
    pub distance: Option<Value>,
    pub duration: Option<Value>,
    pub safety: Option<Value>,
    #[serde(rename = "startDate")]
    pub start_date: Option<Value>,
    #[serde(rename = "foodPreferences")]
    pub food_preferences: Option<Value>,
    #[serde(rename = "transportType")]
    pub transport_type: Option<Value>,
    #[serde(rename = "accommodationType")]
    pub accommodation_type: Option<Value>,

    // Passthrough identity
    pub email: Option<Value>,
    pub phone: Option<Value>,
    #[serde(rename = "currentCity")]
    pub current_city: Option<Value>,
    #[serde(rename = "targetCity")]
    pub target_city: Option<Value>,
}

/// The policy-specific value attached to a ranked record.
/// Flattened so the JSON key is `score` or `likelihood`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScore {
    Score(f64),
    Likelihood(f64),
}

impl PolicyScore {
    pub fn value(&self) -> f64 {
        match self {
            PolicyScore::Score(v) | PolicyScore::Likelihood(v) => *v,
        }
    }

    /// `"{:.1}%"` of the score, or of the likelihood expressed as a percentage.
    pub fn percentage(&self) -> String {
        match self {
            PolicyScore::Score(v) => format!("{v:.1}%"),
            PolicyScore::Likelihood(v) => format!("{:.1}%", v * 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    pub rank: usize,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    #[serde(flatten)]
    pub score: PolicyScore,
    pub score_percentage: String,
    pub current_city: Option<Value>,
    pub target_city: Option<Value>,
    pub budget: Value,
    pub duration: Value,
}

impl ScoredRecord {
    pub fn from_lead(lead: &LeadRecord, rank: usize, score: PolicyScore) -> Self {
        Self {
            rank,
            email: non_null(&lead.email),
            phone: non_null(&lead.phone),
            score_percentage: score.percentage(),
            score,
            current_city: non_null(&lead.current_city),
            target_city: non_null(&lead.target_city),
            budget: bucket_or_default(&lead.budget, &BUDGET),
            duration: bucket_or_default(&lead.duration, &DURATION),
        }
    }
}

fn non_null(value: &Option<Value>) -> Option<Value> {
    value.clone().filter(|v| !v.is_null())
}

/// The submitted bucket label, or the table's default bucket when absent.
/// Unmapped labels are echoed verbatim.
fn bucket_or_default(value: &Option<Value>, table: &BucketTable) -> Value {
    non_null(value).unwrap_or_else(|| Value::from(table.default_bucket))
}

#[derive(Debug, Serialize)]
pub struct ModelMetrics {
    pub total_customers: usize,
    pub features_used: Vec<&'static str>,
    pub timestamp: String,
    pub scoring_policy: ScoringPolicy,
    pub normalizer_mode: NormalizerMode,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub success: bool,
    pub rankings: Vec<ScoredRecord>,
    pub model_metrics: ModelMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_record_reads_camel_case_keys() {
        let lead: LeadRecord = serde_json::from_value(json!({
            "income": "100000+",
            "startDate": "2026-01-01",
            "foodPreferences": ["veg"],
            "currentCity": "Delhi",
            "unknownKey": 42
        }))
        .unwrap();
        assert_eq!(lead.income, Some(json!("100000+")));
        assert_eq!(lead.start_date, Some(json!("2026-01-01")));
        assert_eq!(lead.food_preferences, Some(json!(["veg"])));
        assert_eq!(lead.current_city, Some(json!("Delhi")));
        assert!(lead.budget.is_none());
    }

    #[test]
    fn test_scored_record_flattens_policy_key() {
        let lead = LeadRecord {
            email: Some(json!("a@example.com")),
            budget: Some(Value::Null),
            ..Default::default()
        };
        let scored = ScoredRecord::from_lead(&lead, 1, PolicyScore::Score(72.26));
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["rank"], 1);
        assert_eq!(value["score"], 72.26);
        assert_eq!(value["score_percentage"], "72.3%");
        assert_eq!(value["email"], "a@example.com");
        assert_eq!(value["budget"], "medium");
        assert_eq!(value["duration"], "0-3 months");
        assert!(value["phone"].is_null());
        assert!(value.get("likelihood").is_none());
    }

    #[test]
    fn test_likelihood_percentage_scales_by_hundred() {
        let score = PolicyScore::Likelihood(0.375);
        assert_eq!(score.percentage(), "37.5%");
        let lead = LeadRecord::default();
        let value = serde_json::to_value(ScoredRecord::from_lead(&lead, 2, score)).unwrap();
        assert_eq!(value["likelihood"], 0.375);
        assert!(value.get("score").is_none());
    }

    #[test]
    fn test_unmapped_bucket_labels_are_echoed() {
        let lead = LeadRecord {
            budget: Some(json!("High")),
            duration: Some(json!(6)),
            ..Default::default()
        };
        let scored = ScoredRecord::from_lead(&lead, 1, PolicyScore::Score(10.0));
        let value = serde_json::to_value(scored).unwrap();
        assert_eq!(value["budget"], "High");
        assert_eq!(value["duration"], 6);
    }
}
