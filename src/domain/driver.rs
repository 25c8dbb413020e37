//! Browser driver port for the seller console
//!
//! The console exposes no API for listing tests, so a browser-automation
//! driver stands in for one. The trait models the three interactions the
//! lifecycle needs and nothing else; everything about sessions, selectors
//! and retries is an implementation concern behind it.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::experiment::{Attribute, DailyMetricRow, ExperimentConfig, ExperimentHandle};
use crate::domain::listing::Asin;
use crate::domain::DomainError;

// ============================================================================
// Credentials
// ============================================================================

/// Seller console credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

// ============================================================================
// Session
// ============================================================================

/// An authenticated driver session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

// ============================================================================
// CreateExperimentSpec
// ============================================================================

/// Everything the driver needs to materialize a live test
#[derive(Debug, Clone)]
pub struct CreateExperimentSpec {
    pub asin: Asin,
    pub attribute: Attribute,
    pub control_content: String,
    pub treatment_content: String,
    pub config: ExperimentConfig,
}

// ============================================================================
// DateRange
// ============================================================================

/// Inclusive date range for metric fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

// ============================================================================
// DriverError
// ============================================================================

/// Failures raised by a browser driver
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Experiment creation failed: {0}")]
    Creation(String),

    #[error("Metric fetch failed: {0}")]
    Fetch(String),
}

impl DriverError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Creation(_) => "creation",
            Self::Fetch(_) => "fetch",
        }
    }
}

impl From<DriverError> for DomainError {
    fn from(err: DriverError) -> Self {
        DomainError::collaborator("browser_driver", err.to_string())
    }
}

// ============================================================================
// BrowserDriver
// ============================================================================

/// Automation port against the seller console
#[async_trait]
pub trait BrowserDriver: Send + Sync + Debug {
    /// Authenticate and open a session
    async fn login(&self, credentials: &Credentials) -> Result<Session, DriverError>;

    /// Create a live test and return its console handle
    async fn create_experiment(
        &self,
        session: &Session,
        spec: &CreateExperimentSpec,
    ) -> Result<ExperimentHandle, DriverError>;

    /// Fetch daily metric rows for both arms over a date range
    async fn fetch_daily_metrics(
        &self,
        session: &Session,
        handle: &ExperimentHandle,
        range: DateRange,
    ) -> Result<Vec<DailyMetricRow>, DriverError>;
}
