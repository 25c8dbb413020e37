//! Infrastructure: collaborator implementations and application services

pub mod driver;
pub mod listing;
pub mod logging;
pub mod services;
pub mod store;
