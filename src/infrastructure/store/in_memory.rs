//! In-memory implementation of the experiment repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::experiment::{ExperimentId, ExperimentRecord, ExperimentRepository};
use crate::domain::DomainError;

/// In-memory experiment repository implementation
#[derive(Debug, Default)]
pub struct InMemoryExperimentRepository {
    records: RwLock<HashMap<ExperimentId, ExperimentRecord>>,
}

impl InMemoryExperimentRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExperimentRepository for InMemoryExperimentRepository {
    async fn create(&self, record: &ExperimentRecord) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        if records.contains_key(record.id()) {
            return Err(DomainError::conflict(format!(
                "Experiment already exists: {}",
                record.id()
            )));
        }

        records.insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &ExperimentId) -> Result<ExperimentRecord, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        records
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Experiment not found: {}", id)))
    }

    async fn update(&self, record: &ExperimentRecord) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        if !records.contains_key(record.id()) {
            return Err(DomainError::not_found(format!(
                "Experiment not found: {}",
                record.id()
            )));
        }

        records.insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut results: Vec<_> = records.values().cloned().collect();
        results.sort_by_key(|r| r.created_at());
        Ok(results)
    }
}
