//! Scripted browser driver
//!
//! Replays canned console responses instead of automating a real browser.
//! Used by the demo command and the integration tests; a Playwright-style
//! driver would implement the same trait against the live console.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::driver::{
    BrowserDriver, CreateExperimentSpec, Credentials, DateRange, DriverError, Session,
};
use crate::domain::experiment::{DailyMetricRow, ExperimentHandle};

/// Browser driver that replays scripted responses
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    accepted_username: Option<String>,
    fail_creation: Option<String>,
    metric_batches: Mutex<Vec<Vec<DailyMetricRow>>>,
    login_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    handle_counter: AtomicUsize,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only this username at login
    pub fn with_accepted_username(mut self, username: impl Into<String>) -> Self {
        self.accepted_username = Some(username.into());
        self
    }

    /// Make every creation attempt fail with the given message
    pub fn with_failing_creation(mut self, message: impl Into<String>) -> Self {
        self.fail_creation = Some(message.into());
        self
    }

    /// Queue a batch of rows; each fetch pops the next batch. Once the
    /// queue is drained, fetches return an empty row set.
    pub fn push_metric_batch(&self, rows: Vec<DailyMetricRow>) {
        if let Ok(mut batches) = self.metric_batches.lock() {
            batches.push(rows);
        }
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn login(&self, credentials: &Credentials) -> Result<Session, DriverError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(expected) = &self.accepted_username {
            if &credentials.username != expected {
                return Err(DriverError::Auth(format!(
                    "unknown account: {}",
                    credentials.username
                )));
            }
        }

        Ok(Session::new(format!("session-{}", credentials.username)))
    }

    async fn create_experiment(
        &self,
        _session: &Session,
        spec: &CreateExperimentSpec,
    ) -> Result<ExperimentHandle, DriverError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fail_creation {
            return Err(DriverError::Creation(message.clone()));
        }

        let seq = self.handle_counter.fetch_add(1, Ordering::SeqCst);
        Ok(ExperimentHandle::new(format!(
            "EXP-{}-{}-{}",
            spec.asin, spec.attribute, seq
        )))
    }

    async fn fetch_daily_metrics(
        &self,
        _session: &Session,
        _handle: &ExperimentHandle,
        range: DateRange,
    ) -> Result<Vec<DailyMetricRow>, DriverError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let mut batches = self
            .metric_batches
            .lock()
            .map_err(|e| DriverError::Fetch(format!("scripted state poisoned: {}", e)))?;

        if batches.is_empty() {
            return Ok(Vec::new());
        }

        let batch = batches.remove(0);
        Ok(batch
            .into_iter()
            .filter(|row| range.contains(row.date()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::{Attribute, ExperimentConfig, VariantArm};
    use crate::domain::listing::Asin;
    use chrono::NaiveDate;

    fn spec() -> CreateExperimentSpec {
        CreateExperimentSpec {
            asin: Asin::new("B01EXAMPLE").unwrap(),
            attribute: Attribute::Title,
            control_content: "old title".to_string(),
            treatment_content: "new title".to_string(),
            config: ExperimentConfig::default(),
        }
    }

    fn row(day: u32) -> DailyMetricRow {
        DailyMetricRow::new(
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            VariantArm::Control,
            1000,
            20,
            2,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_and_handle_sequence() {
        let driver = ScriptedDriver::new();
        let session = driver
            .login(&Credentials::new("seller", "pw"))
            .await
            .unwrap();

        let first = driver.create_experiment(&session, &spec()).await.unwrap();
        let second = driver.create_experiment(&session, &spec()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(driver.create_calls(), 2);
    }

    #[tokio::test]
    async fn test_rejects_unknown_username() {
        let driver = ScriptedDriver::new().with_accepted_username("seller");
        let err = driver
            .login(&Credentials::new("intruder", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Auth(_)));
    }

    #[tokio::test]
    async fn test_fetch_pops_batches_and_filters_range() {
        let driver = ScriptedDriver::new();
        driver.push_metric_batch(vec![row(1), row(2), row(20)]);

        let session = driver.login(&Credentials::new("s", "p")).await.unwrap();
        let handle = ExperimentHandle::new("EXP-1");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        );

        let rows = driver.fetch_daily_metrics(&session, &handle, range).await.unwrap();
        assert_eq!(rows.len(), 2);

        // Queue drained, next fetch is empty
        let rows = driver.fetch_daily_metrics(&session, &handle, range).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_scripted_creation_failure() {
        let driver = ScriptedDriver::new().with_failing_creation("dialog did not open");
        let session = driver.login(&Credentials::new("s", "p")).await.unwrap();

        let err = driver.create_experiment(&session, &spec()).await.unwrap_err();
        assert_eq!(err, DriverError::Creation("dialog did not open".to_string()));
    }
}
