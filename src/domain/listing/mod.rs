//! Listing domain module

mod candidate;
mod store;

pub use candidate::{Asin, ListingCandidate, ListingValidationError, MAX_ASIN_LENGTH};
pub use store::ListingStore;
