//! Core domain: listings, quality scoring and experiment lifecycle

pub mod driver;
pub mod experiment;
pub mod listing;
pub mod quality;

mod error;

pub use error::DomainError;
