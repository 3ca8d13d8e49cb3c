// Lead ranking: field mapping, standardization and weighted scoring of
// relocation leads, served from POST /rank_customers.

pub mod handlers;
pub mod mapper;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod policy;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("No data provided")]
    EmptyBatch,

    #[error("Invalid startDate: {0}")]
    InvalidStartDate(String),

    #[error("record {index}: {source}")]
    Record {
        index: usize,
        source: Box<RankingError>,
    },

    #[error("Lead at index {index} is not an object: {source}")]
    MalformedRecord {
        index: usize,
        source: serde_json::Error,
    },

    #[error("Expected a JSON array of leads, got {0}")]
    NotABatch(&'static str),

    #[error("Normalization state is unavailable after a panic in another request")]
    ScaleStatePoisoned,
}
