//! JSON file implementation of the experiment repository
//!
//! One pretty-printed JSON document per experiment under a configured
//! directory, named `<id>.json`. The full record is rewritten on every
//! update, so the file on disk is always a complete audit trail.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::experiment::{ExperimentId, ExperimentRecord, ExperimentRepository};
use crate::domain::DomainError;

/// File-backed experiment repository implementation
#[derive(Debug)]
pub struct JsonFileExperimentRepository {
    dir: PathBuf,
}

impl JsonFileExperimentRepository {
    /// Open a repository rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &ExperimentId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn write_record(&self, path: &Path, record: &ExperimentRecord) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| DomainError::storage(format!("Failed to serialize record: {}", e)))?;

        tokio::fs::write(path, json)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!(id = %record.id(), path = %path.display(), "Persisted experiment record");
        Ok(())
    }

    async fn read_record(&self, path: &Path) -> Result<ExperimentRecord, DomainError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read {}: {}", path.display(), e)))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::storage(format!("Corrupt record at {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl ExperimentRepository for JsonFileExperimentRepository {
    async fn create(&self, record: &ExperimentRecord) -> Result<(), DomainError> {
        let path = self.path_for(record.id());

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to stat {}: {}", path.display(), e)))?
        {
            return Err(DomainError::conflict(format!(
                "Experiment already exists: {}",
                record.id()
            )));
        }

        self.write_record(&path, record).await
    }

    async fn get(&self, id: &ExperimentId) -> Result<ExperimentRecord, DomainError> {
        let path = self.path_for(id);

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to stat {}: {}", path.display(), e)))?
        {
            return Err(DomainError::not_found(format!("Experiment not found: {}", id)));
        }

        self.read_record(&path).await
    }

    async fn update(&self, record: &ExperimentRecord) -> Result<(), DomainError> {
        let path = self.path_for(record.id());

        if !tokio::fs::try_exists(&path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to stat {}: {}", path.display(), e)))?
        {
            return Err(DomainError::not_found(format!(
                "Experiment not found: {}",
                record.id()
            )));
        }

        self.write_record(&path, record).await
    }

    async fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read {}: {}", self.dir.display(), e)))?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read directory entry: {}", e)))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                records.push(self.read_record(&path).await?);
            }
        }

        records.sort_by_key(|r| r.created_at());
        Ok(records)
    }
}
