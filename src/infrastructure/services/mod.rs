//! Application services

mod lifecycle;

pub use lifecycle::{CreateExperimentRequest, ExperimentLifecycle};
