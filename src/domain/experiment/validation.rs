//! Experiment validation utilities

use thiserror::Error;

/// Maximum length for experiment IDs
pub const MAX_EXPERIMENT_ID_LENGTH: usize = 50;

/// Maximum configurable experiment duration in days
pub const MAX_DURATION_DAYS: u16 = 90;

/// Validation errors for experiment inputs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExperimentValidationError {
    #[error("Experiment ID cannot be empty")]
    EmptyId,

    #[error("Experiment ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("Experiment ID must start with a letter or number")]
    InvalidIdStart,

    #[error("Experiment ID contains invalid character: '{0}'")]
    InvalidIdCharacter(char),

    #[error("Treatment content cannot be empty")]
    EmptyTreatment,

    #[error("Control content cannot be empty")]
    EmptyControl,

    #[error("Duration must be between 1 and {max} days, got {got}")]
    InvalidDuration { got: u16, max: u16 },

    #[error("Traffic split must be between 1 and 99 percent, got {0}")]
    InvalidTrafficSplit(u8),

    #[error("Clicks ({clicks}) cannot exceed impressions ({impressions})")]
    ClicksExceedImpressions { clicks: u64, impressions: u64 },
}

/// Validate an experiment ID slug
pub fn validate_experiment_id(id: &str) -> Result<(), ExperimentValidationError> {
    if id.is_empty() {
        return Err(ExperimentValidationError::EmptyId);
    }

    if id.len() > MAX_EXPERIMENT_ID_LENGTH {
        return Err(ExperimentValidationError::IdTooLong(
            MAX_EXPERIMENT_ID_LENGTH,
        ));
    }

    let first = id.chars().next().unwrap();
    if !first.is_ascii_alphanumeric() {
        return Err(ExperimentValidationError::InvalidIdStart);
    }

    for ch in id.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
            return Err(ExperimentValidationError::InvalidIdCharacter(ch));
        }
    }

    Ok(())
}
