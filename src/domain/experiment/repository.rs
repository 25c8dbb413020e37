//! Experiment repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ExperimentId, ExperimentRecord};
use crate::domain::DomainError;

/// Persistence port for experiment records.
///
/// Implementations own durability only; transition legality and metric
/// dedup live on the record itself.
#[async_trait]
pub trait ExperimentRepository: Send + Sync + Debug {
    /// Persist a new record. Fails with a conflict if the ID already exists.
    async fn create(&self, record: &ExperimentRecord) -> Result<(), DomainError>;

    /// Fetch a record by ID
    async fn get(&self, id: &ExperimentId) -> Result<ExperimentRecord, DomainError>;

    /// Overwrite an existing record
    async fn update(&self, record: &ExperimentRecord) -> Result<(), DomainError>;

    /// List every stored record, ordered by creation time
    async fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError>;
}
