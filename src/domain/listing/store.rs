//! Listing store collaborator contract

use async_trait::async_trait;
use std::fmt::Debug;

use super::candidate::{Asin, ListingCandidate};
use crate::domain::DomainError;

/// Supplies candidate listing content by product identifier.
///
/// The core only consumes the returned record; where the content actually
/// lives (object storage, catalog API, fixture file) is the implementor's
/// concern.
#[async_trait]
pub trait ListingStore: Send + Sync + Debug {
    /// Fetch the listing for an ASIN, `NotFound` on miss
    async fn get_listing(&self, asin: &Asin) -> Result<ListingCandidate, DomainError>;
}
