//! Experiment lifecycle domain: records, metrics and winner determination

mod entity;
mod metrics;
mod repository;
mod resolver;
mod validation;

pub use entity::{
    Attribute, ExperimentConfig, ExperimentHandle, ExperimentId, ExperimentRecord,
    ExperimentState, TransitionEntry,
};
pub use metrics::{AggregateStats, ArmTotals, DailyMetricRow, MetricsAggregator, VariantArm};
pub use repository::ExperimentRepository;
pub use resolver::{Recommendation, ResolutionPolicy, Verdict, Winner, WinnerResolver};
pub use validation::{
    validate_experiment_id, ExperimentValidationError, MAX_DURATION_DAYS,
    MAX_EXPERIMENT_ID_LENGTH,
};
