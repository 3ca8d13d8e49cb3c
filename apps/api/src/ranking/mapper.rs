//! Field Mapper: turns the bucketed form answers of a lead into numeric proxies.
//!
//! Every bucket field goes through exactly one [`BucketTable`]. A missing (or
//! `null`) value is replaced by the table's default bucket *before* lookup; a
//! value that is present but not in the table takes the table's fallback proxy.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::ranking::models::LeadRecord;
use crate::ranking::RankingError;

pub const FEATURE_COUNT: usize = 9;

/// One row of numeric proxies, in this column order:
/// income, budget, distance, duration, safety, days_until_start,
/// food_count, transport_count, accommodation_count.
pub type FeatureRow = [f64; FEATURE_COUNT];

/// Display labels for the feature columns, reported in `model_metrics`.
pub const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "Income",
    "Budget",
    "Distance",
    "Duration",
    "Safety",
    "Start Date",
    "Food Preferences",
    "Transport Type",
    "Accommodation Type",
];

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug)]
pub struct BucketTable {
    pub field: &'static str,
    pub entries: &'static [(&'static str, f64)],
    pub default_bucket: &'static str,
    pub fallback: f64,
}

impl BucketTable {
    fn lookup(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(bucket, _)| *bucket == label)
            .map(|(_, proxy)| *proxy)
    }

    pub fn proxy(&self, raw: Option<&Value>) -> f64 {
        let mapped = match raw {
            None | Some(Value::Null) => self.lookup(self.default_bucket),
            Some(Value::String(label)) => self.lookup(label),
            Some(_) => None,
        };
        mapped.unwrap_or_else(|| {
            debug!(field = self.field, value = ?raw, "unmapped bucket value, using fallback");
            self.fallback
        })
    }
}

pub const INCOME: BucketTable = BucketTable {
    field: "income",
    entries: &[
        ("0-30000", 15_000.0),
        ("30000-50000", 40_000.0),
        ("50000-100000", 75_000.0),
        ("100000+", 150_000.0),
    ],
    default_bucket: "0-30000",
    fallback: 15_000.0,
};

pub const BUDGET: BucketTable = BucketTable {
    field: "budget",
    entries: &[("low", 1.0), ("medium", 2.0), ("high", 3.0)],
    default_bucket: "medium",
    fallback: 1.0,
};

pub const DISTANCE: BucketTable = BucketTable {
    field: "distance",
    entries: &[
        ("0-300", 150.0),
        ("300-500", 400.0),
        ("500-1000", 750.0),
        ("1000+", 1_200.0),
    ],
    default_bucket: "0-300",
    fallback: 150.0,
};

pub const DURATION: BucketTable = BucketTable {
    field: "duration",
    entries: &[
        ("0-3 months", 1.5),
        ("3-6 months", 4.5),
        ("6-12 months", 9.0),
        ("12+ months", 15.0),
        ("permanent", 24.0),
    ],
    default_bucket: "0-3 months",
    fallback: 1.5,
};

pub const SAFETY: BucketTable = BucketTable {
    field: "safety",
    entries: &[("low", 1.0), ("medium", 2.0), ("high", 3.0)],
    default_bucket: "medium",
    fallback: 1.0,
};

/// Number of selections in a multi-select answer. Anything that is not an
/// array counts as zero.
pub fn selection_count(raw: Option<&Value>) -> f64 {
    match raw {
        Some(Value::Array(items)) => items.len() as f64,
        _ => 0.0,
    }
}

/// Parses an ISO-like start date. Naive values are taken as UTC.
pub fn parse_start_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Whole days from `now` until the lead's start date, rounded toward negative
/// infinity. A missing start date counts as `now`. Past dates stay negative.
pub fn days_until_start(raw: Option<&Value>, now: DateTime<Utc>) -> Result<f64, RankingError> {
    let start = match raw {
        None | Some(Value::Null) => now,
        Some(Value::String(text)) => {
            parse_start_date(text).ok_or_else(|| RankingError::InvalidStartDate(text.clone()))?
        }
        Some(other) => return Err(RankingError::InvalidStartDate(other.to_string())),
    };
    let seconds = (start - now).num_seconds();
    Ok(seconds.div_euclid(SECONDS_PER_DAY) as f64)
}

/// Maps one lead to its raw (unscaled) feature row.
pub fn map_record(lead: &LeadRecord, now: DateTime<Utc>) -> Result<FeatureRow, RankingError> {
    Ok([
        INCOME.proxy(lead.income.as_ref()),
        BUDGET.proxy(lead.budget.as_ref()),
        DISTANCE.proxy(lead.distance.as_ref()),
        DURATION.proxy(lead.duration.as_ref()),
        SAFETY.proxy(lead.safety.as_ref()),
        days_until_start(lead.start_date.as_ref(), now)?,
        selection_count(lead.food_preferences.as_ref()),
        selection_count(lead.transport_type.as_ref()),
        selection_count(lead.accommodation_type.as_ref()),
    ])
}
