//! Weighted Aggregator: turns standardized feature rows into one score per lead.
//!
//! Two strategies share the same pipeline:
//! - `Additive`: fixed point budgets (sum 100) with an affine rescale of each
//!   z-score into its budget; distance and days-until-start are inverted.
//!   The total is clamped to [0, 100].
//! - `Probabilistic`: small linear weights applied to raw z-scores, then a
//!   softmax across the batch. No feature is inverted here, so a farther or
//!   later lead raises its likelihood. This disagrees with `Additive` and is
//!   kept as-is.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::ranking::mapper::FeatureRow;
use crate::ranking::models::PolicyScore;

const INCOME: usize = 0;
const BUDGET: usize = 1;
const DISTANCE: usize = 2;
const DURATION: usize = 3;
const SAFETY: usize = 4;
const DAYS_UNTIL_START: usize = 5;
const PREFERENCES: std::ops::Range<usize> = 6..9;

#[derive(Debug, Clone)]
pub struct FeatureWeights {
    pub income: f64,
    pub budget: f64,
    pub distance: f64,
    pub duration: f64,
    pub safety: f64,
    pub days_until_start: f64,
    pub preferences: f64,
}

impl FeatureWeights {
    /// Point budgets of the additive score. Sums to 100.
    pub const ADDITIVE: FeatureWeights = FeatureWeights {
        income: 20.0,
        budget: 15.0,
        distance: 10.0,
        duration: 20.0,
        safety: 10.0,
        days_until_start: 10.0,
        preferences: 15.0,
    };

    /// Linear weights of the probabilistic score. Sums to 1.
    pub const PROBABILISTIC: FeatureWeights = FeatureWeights {
        income: 0.20,
        budget: 0.15,
        distance: 0.10,
        duration: 0.20,
        safety: 0.10,
        days_until_start: 0.10,
        preferences: 0.15,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    Additive,
    Probabilistic,
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringPolicy::Additive => write!(f, "additive"),
            ScoringPolicy::Probabilistic => write!(f, "probabilistic"),
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" | "score" => Ok(ScoringPolicy::Additive),
            "probabilistic" | "likelihood" => Ok(ScoringPolicy::Probabilistic),
            other => Err(format!(
                "unknown scoring policy '{other}' (expected 'additive' or 'probabilistic')"
            )),
        }
    }
}

impl ScoringPolicy {
    /// Scores every standardized row. Output is index-aligned with the input.
    pub fn score(&self, rows: &[FeatureRow]) -> Vec<PolicyScore> {
        match self {
            ScoringPolicy::Additive => rows
                .iter()
                .map(|z| PolicyScore::Score(additive_score(z, &FeatureWeights::ADDITIVE)))
                .collect(),
            ScoringPolicy::Probabilistic => {
                let logits: Vec<f64> = rows
                    .iter()
                    .map(|z| linear_logit(z, &FeatureWeights::PROBABILISTIC))
                    .collect();
                softmax(&logits)
                    .into_iter()
                    .map(PolicyScore::Likelihood)
                    .collect()
            }
        }
    }
}

fn preference_mean(z: &FeatureRow) -> f64 {
    let prefs = &z[PREFERENCES];
    prefs.iter().sum::<f64>() / prefs.len() as f64
}

/// `(z + 2) / 4` maps the plausible z range [-2, 2] onto [0, 1].
fn wide(z: f64) -> f64 {
    (z + 2.0) / 4.0
}

/// `(z + 1) / 2` maps [-1, 1] onto [0, 1].
fn narrow(z: f64) -> f64 {
    (z + 1.0) / 2.0
}

pub fn additive_score(z: &FeatureRow, w: &FeatureWeights) -> f64 {
    let total = w.income * wide(z[INCOME])
        + w.budget * narrow(z[BUDGET])
        + w.distance * (1.0 - wide(z[DISTANCE]))
        + w.duration * wide(z[DURATION])
        + w.safety * narrow(z[SAFETY])
        + w.days_until_start * (1.0 - wide(z[DAYS_UNTIL_START]))
        + w.preferences * wide(preference_mean(z));
    total.clamp(0.0, 100.0)
}

pub fn linear_logit(z: &FeatureRow, w: &FeatureWeights) -> f64 {
    w.income * z[INCOME]
        + w.budget * z[BUDGET]
        + w.distance * z[DISTANCE]
        + w.duration * z[DURATION]
        + w.safety * z[SAFETY]
        + w.days_until_start * z[DAYS_UNTIL_START]
        + w.preferences * preference_mean(z)
}

/// Numerically stable softmax: the batch max is subtracted before exponentiating.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
