use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use serde_json::{Map, Value};

use crate::errors::AppError;

/// In-process list of scored leads. Lives as long as the server process.
#[derive(Debug, Clone, Default)]
pub struct LeadStore {
    leads: Arc<Mutex<Vec<Map<String, Value>>>>,
}

impl LeadStore {
    pub fn insert(&self, lead: Map<String, Value>) -> Result<usize, AppError> {
        let mut guard = self
            .leads
            .lock()
            .map_err(|_| anyhow!("lead store lock poisoned"))?;
        guard.push(lead);
        Ok(guard.len())
    }

    /// All stored leads in insertion order.
    pub fn all(&self) -> Result<Vec<Map<String, Value>>, AppError> {
        let guard = self
            .leads
            .lock()
            .map_err(|_| anyhow!("lead store lock poisoned"))?;
        Ok(guard.clone())
    }
}
