//! In-memory listing store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::listing::{Asin, ListingCandidate, ListingStore};
use crate::domain::DomainError;

/// In-memory listing store implementation
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    listings: RwLock<HashMap<Asin, ListingCandidate>>,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, candidate: ListingCandidate) -> Result<(), DomainError> {
        let mut listings = self
            .listings
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        listings.insert(candidate.asin().clone(), candidate);
        Ok(())
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn get_listing(&self, asin: &Asin) -> Result<ListingCandidate, DomainError> {
        let listings = self
            .listings
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        listings
            .get(asin)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Listing not found: {}", asin)))
    }
}
