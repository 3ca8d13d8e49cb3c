use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ranking::mapper::{map_record, FeatureRow};
use crate::ranking::models::{LeadRecord, ScoredRecord};
use crate::ranking::normalizer::ScaleStore;
use crate::ranking::policy::ScoringPolicy;
use crate::ranking::RankingError;

/// Runs a whole batch through mapping, standardization and scoring, then
/// sorts descending by score and assigns ranks 1..N.
///
/// Ties keep their input order. Either every lead is ranked or the call fails.
pub fn rank_leads(
    leads: &[LeadRecord],
    policy: ScoringPolicy,
    scales: &ScaleStore,
    now: DateTime<Utc>,
) -> Result<Vec<ScoredRecord>, RankingError> {
    if leads.is_empty() {
        return Err(RankingError::EmptyBatch);
    }

    let raw: Vec<FeatureRow> = leads
        .iter()
        .enumerate()
        .map(|(index, lead)| {
            map_record(lead, now).map_err(|source| RankingError::Record {
                index,
                source: Box::new(source),
            })
        })
        .collect::<Result<_, _>>()?;

    let standardized = scales.standardize(&raw)?;
    let scores = policy.score(&standardized);

    let mut order: Vec<usize> = (0..leads.len()).collect();
    // sort_by is stable, so equal scores keep input order
    order.sort_by(|&a, &b| scores[b].value().total_cmp(&scores[a].value()));

    debug!(policy = %policy, leads = leads.len(), "ranked batch");

    Ok(order
        .into_iter()
        .enumerate()
        .map(|(position, index)| {
            ScoredRecord::from_lead(&leads[index], position + 1, scores[index])
        })
        .collect())
}
