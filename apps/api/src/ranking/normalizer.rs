//! Feature Normalizer: per-column standardization of a batch of feature rows.
//!
//! Statistics are population statistics (divide by N). A column with zero
//! variance is scaled by 1.0, so a single-record batch standardizes to all zeros.
//!
//! Where the fitted statistics come from is an explicit choice, see
//! [`NormalizerMode`]. `Cached` keeps the first batch's statistics for the
//! lifetime of the process and normalizes every later batch against them,
//! even when that batch comes from a completely different population.

use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;

use serde::Serialize;
use tracing::info;

use crate::ranking::mapper::{FeatureRow, FEATURE_COUNT};
use crate::ranking::RankingError;

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: FeatureRow,
    pub std: FeatureRow,
}

impl StandardScaler {
    pub fn fit(rows: &[FeatureRow]) -> Result<Self, RankingError> {
        if rows.is_empty() {
            return Err(RankingError::EmptyBatch);
        }
        let n = rows.len() as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (acc, value) in mean.iter_mut().zip(row) {
                *acc += value;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut std = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((acc, value), m) in std.iter_mut().zip(row).zip(&mean) {
                *acc += (value - m).powi(2);
            }
        }
        for s in std.iter_mut() {
            let sd = (*s / n).sqrt();
            *s = if sd == 0.0 || !sd.is_finite() { 1.0 } else { sd };
        }

        Ok(Self { mean, std })
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Vec<FeatureRow> {
        rows.iter()
            .map(|row| {
                let mut z = [0.0; FEATURE_COUNT];
                for (col, out) in z.iter_mut().enumerate() {
                    *out = (row[col] - self.mean[col]) / self.std[col];
                }
                z
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizerMode {
    /// Fit fresh statistics for every batch. Deterministic per batch.
    Refit,
    /// Fit once on the first batch seen, reuse for every later batch.
    Cached,
}

impl fmt::Display for NormalizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizerMode::Refit => write!(f, "refit"),
            NormalizerMode::Cached => write!(f, "cached"),
        }
    }
}

impl FromStr for NormalizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refit" => Ok(NormalizerMode::Refit),
            "cached" => Ok(NormalizerMode::Cached),
            other => Err(format!(
                "unknown normalizer mode '{other}' (expected 'refit' or 'cached')"
            )),
        }
    }
}

/// Owner of the fitted statistics shared across requests.
#[derive(Debug)]
pub struct ScaleStore {
    mode: NormalizerMode,
    cached: RwLock<Option<StandardScaler>>,
}

impl ScaleStore {
    pub fn new(mode: NormalizerMode) -> Self {
        Self {
            mode,
            cached: RwLock::new(None),
        }
    }

    pub fn mode(&self) -> NormalizerMode {
        self.mode
    }

    /// Returns the scaler to apply to `rows` under the configured mode.
    pub fn scaler_for(&self, rows: &[FeatureRow]) -> Result<StandardScaler, RankingError> {
        match self.mode {
            NormalizerMode::Refit => StandardScaler::fit(rows),
            NormalizerMode::Cached => {
                {
                    let guard = self
                        .cached
                        .read()
                        .map_err(|_| RankingError::ScaleStatePoisoned)?;
                    if let Some(scaler) = guard.as_ref() {
                        return Ok(scaler.clone());
                    }
                }
                let mut guard = self
                    .cached
                    .write()
                    .map_err(|_| RankingError::ScaleStatePoisoned)?;
                // Another request may have fitted between the two locks
                if let Some(scaler) = guard.as_ref() {
                    return Ok(scaler.clone());
                }
                let scaler = StandardScaler::fit(rows)?;
                info!(rows = rows.len(), "fitted cached normalization scale");
                *guard = Some(scaler.clone());
                Ok(scaler)
            }
        }
    }

    /// Standardizes `rows` under the configured mode.
    pub fn standardize(&self, rows: &[FeatureRow]) -> Result<Vec<FeatureRow>, RankingError> {
        Ok(self.scaler_for(rows)?.transform(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(first: f64, second: f64) -> FeatureRow {
        let mut r = [0.0; FEATURE_COUNT];
        r[0] = first;
        r[1] = second;
        r
    }

    #[test]
    fn test_fit_uses_population_std() {
        let rows = [row(1.0, 5.0), row(3.0, 5.0)];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean[0], 2.0);
        // population std of [1, 3] is 1.0 (sample std would be ~1.414)
        assert!((scaler.std[0] - 1.0).abs() < 1e-12);
        let z = scaler.transform(&rows);
        assert!((z[0][0] + 1.0).abs() < 1e-12);
        assert!((z[1][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_column_scales_by_one() {
        let rows = [row(1.0, 5.0), row(3.0, 5.0)];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.std[1], 1.0);
        let z = scaler.transform(&rows);
        assert_eq!(z[0][1], 0.0);
        assert_eq!(z[1][1], 0.0);
    }

    #[test]
    fn test_single_row_standardizes_to_zeros() {
        let rows = [row(150_000.0, 3.0)];
        let z = StandardScaler::fit(&rows).unwrap().transform(&rows);
        assert!(z[0].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fit_rejects_empty_batch() {
        assert!(matches!(
            StandardScaler::fit(&[]),
            Err(RankingError::EmptyBatch)
        ));
    }

    #[test]
    fn test_refit_mode_ignores_previous_batches() {
        let store = ScaleStore::new(NormalizerMode::Refit);
        store.standardize(&[row(0.0, 0.0), row(100.0, 0.0)]).unwrap();
        let z = store.standardize(&[row(1.0, 0.0), row(3.0, 0.0)]).unwrap();
        assert!((z[0][0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cached_mode_reuses_first_fit() {
        let store = ScaleStore::new(NormalizerMode::Cached);
        let first = [row(1.0, 0.0), row(3.0, 0.0)];
        store.standardize(&first).unwrap();

        // Normalized against mean 2 / std 1 from the first batch
        let z = store.standardize(&[row(10.0, 0.0), row(20.0, 0.0)]).unwrap();
        assert!((z[0][0] - 8.0).abs() < 1e-12);
        assert!((z[1][0] - 18.0).abs() < 1e-12);

        // A fresh store fits the same batch on its own statistics
        let fresh = ScaleStore::new(NormalizerMode::Cached);
        let z = fresh.standardize(&[row(10.0, 0.0), row(20.0, 0.0)]).unwrap();
        assert!((z[0][0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("refit".parse::<NormalizerMode>(), Ok(NormalizerMode::Refit));
        assert_eq!(" Cached ".parse::<NormalizerMode>(), Ok(NormalizerMode::Cached));
        assert!("sticky".parse::<NormalizerMode>().is_err());
    }
}
