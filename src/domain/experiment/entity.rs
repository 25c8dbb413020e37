//! Experiment record, state machine and configuration

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::DailyMetricRow;
use super::resolver::Verdict;
use super::validation::{validate_experiment_id, ExperimentValidationError, MAX_DURATION_DAYS};
use crate::domain::listing::Asin;
use crate::domain::quality::EligibilityDecision;
use crate::domain::DomainError;

// ============================================================================
// ExperimentId
// ============================================================================

/// Unique identifier for an experiment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExperimentId(String);

impl ExperimentId {
    /// Create a new experiment ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, ExperimentValidationError> {
        let id = id.into();
        validate_experiment_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random ID
    pub fn generate() -> Self {
        Self(format!("exp-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExperimentId {
    type Error = ExperimentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExperimentId> for String {
    fn from(id: ExperimentId) -> Self {
        id.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ExperimentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// The single listing attribute a lifecycle tests.
///
/// Sequential testing across attributes is caller-level orchestration over
/// multiple records, never internal state of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    Title,
    Bullet1,
    Bullet2,
    Bullet3,
    Bullet4,
    Bullet5,
    Description,
}

impl Attribute {
    /// 1-based bullet slot, `None` for title and description
    pub fn bullet_slot(&self) -> Option<usize> {
        match self {
            Self::Bullet1 => Some(1),
            Self::Bullet2 => Some(2),
            Self::Bullet3 => Some(3),
            Self::Bullet4 => Some(4),
            Self::Bullet5 => Some(5),
            Self::Title | Self::Description => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "TITLE",
            Self::Bullet1 => "BULLET_1",
            Self::Bullet2 => "BULLET_2",
            Self::Bullet3 => "BULLET_3",
            Self::Bullet4 => "BULLET_4",
            Self::Bullet5 => "BULLET_5",
            Self::Description => "DESCRIPTION",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// ExperimentState
// ============================================================================

/// Lifecycle state of an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentState {
    /// Record created, no side effects yet
    #[default]
    Draft,
    /// Quality gate in progress; also guards the in-flight creation call
    Validating,
    /// Blocked by the eligibility gate (terminal)
    Blocked,
    /// Live test materialized and serving traffic
    Running,
    /// Accumulating daily metrics
    Collecting,
    /// Resolved with an adopt or rollback verdict (terminal)
    Complete,
    /// Resolved inconclusive; caller may spawn a new draft (terminal)
    Retest,
    /// Explicitly abandoned before resolution (terminal)
    Abandoned,
}

impl ExperimentState {
    /// Whether no further transitions are accepted from this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Blocked | Self::Complete | Self::Retest | Self::Abandoned
        )
    }

    /// Check if a transition to the target state is valid
    pub fn can_transition_to(&self, target: ExperimentState) -> bool {
        if target == Self::Abandoned {
            return !self.is_terminal();
        }

        matches!(
            (self, target),
            (Self::Draft, Self::Validating)
                | (Self::Validating, Self::Blocked)
                | (Self::Validating, Self::Running)
                | (Self::Running, Self::Collecting)
                | (Self::Collecting, Self::Complete)
                | (Self::Collecting, Self::Retest)
        )
    }
}

impl fmt::Display for ExperimentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Draft => "DRAFT",
            Self::Validating => "VALIDATING",
            Self::Blocked => "BLOCKED",
            Self::Running => "RUNNING",
            Self::Collecting => "COLLECTING",
            Self::Complete => "COMPLETE",
            Self::Retest => "RETEST",
            Self::Abandoned => "ABANDONED",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// TransitionEntry
// ============================================================================

/// One timestamped entry in the transition history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEntry {
    pub state: ExperimentState,
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// ExperimentConfig
// ============================================================================

/// Duration and traffic configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Test duration in days
    pub duration_days: u16,
    /// Percentage of traffic served the control variant
    pub control_split_percent: u8,
}

impl ExperimentConfig {
    pub fn new(duration_days: u16, control_split_percent: u8) -> Result<Self, ExperimentValidationError> {
        if duration_days == 0 || duration_days > MAX_DURATION_DAYS {
            return Err(ExperimentValidationError::InvalidDuration {
                got: duration_days,
                max: MAX_DURATION_DAYS,
            });
        }

        if control_split_percent == 0 || control_split_percent >= 100 {
            return Err(ExperimentValidationError::InvalidTrafficSplit(
                control_split_percent,
            ));
        }

        Ok(Self {
            duration_days,
            control_split_percent,
        })
    }

    /// Whether a metric date falls inside the window opened at `start`
    pub fn window_contains(&self, start: NaiveDate, date: NaiveDate) -> bool {
        date >= start && date < start + chrono::Days::new(self.duration_days as u64)
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            duration_days: 28,
            control_split_percent: 50,
        }
    }
}

// ============================================================================
// ExperimentHandle
// ============================================================================

/// Opaque handle issued by the browser driver for a live test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentHandle(String);

impl ExperimentHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ExperimentRecord
// ============================================================================

/// Full audit trail of one experiment: content, configuration, transition
/// history, metric-row history and, once known, the gate decision and
/// verdict. Mutated only through its transition operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRecord {
    id: ExperimentId,
    asin: Asin,
    attribute: Attribute,
    control_content: String,
    treatment_content: String,
    config: ExperimentConfig,
    state: ExperimentState,
    history: Vec<TransitionEntry>,
    #[serde(default)]
    metrics: Vec<DailyMetricRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handle: Option<ExperimentHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    eligibility: Option<EligibilityDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    verdict: Option<Verdict>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ExperimentRecord {
    /// Create a draft record. No side effects.
    pub fn new(
        id: ExperimentId,
        asin: Asin,
        attribute: Attribute,
        control_content: impl Into<String>,
        treatment_content: impl Into<String>,
        config: ExperimentConfig,
    ) -> Result<Self, ExperimentValidationError> {
        let control_content = control_content.into();
        let treatment_content = treatment_content.into();

        if treatment_content.trim().is_empty() {
            return Err(ExperimentValidationError::EmptyTreatment);
        }
        if control_content.trim().is_empty() {
            return Err(ExperimentValidationError::EmptyControl);
        }

        let now = Utc::now();
        Ok(Self {
            id,
            asin,
            attribute,
            control_content,
            treatment_content,
            config,
            state: ExperimentState::Draft,
            history: vec![TransitionEntry {
                state: ExperimentState::Draft,
                at: now,
                note: None,
            }],
            metrics: Vec::new(),
            handle: None,
            eligibility: None,
            verdict: None,
            created_at: now,
            updated_at: now,
        })
    }

    // Getters

    pub fn id(&self) -> &ExperimentId {
        &self.id
    }

    pub fn asin(&self) -> &Asin {
        &self.asin
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn control_content(&self) -> &str {
        &self.control_content
    }

    pub fn treatment_content(&self) -> &str {
        &self.treatment_content
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    pub fn history(&self) -> &[TransitionEntry] {
        &self.history
    }

    pub fn metrics(&self) -> &[DailyMetricRow] {
        &self.metrics
    }

    pub fn handle(&self) -> Option<&ExperimentHandle> {
        self.handle.as_ref()
    }

    pub fn eligibility(&self) -> Option<&EligibilityDecision> {
        self.eligibility.as_ref()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Timestamp of the transition into `Running`, if it happened
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.history
            .iter()
            .find(|e| e.state == ExperimentState::Running)
            .map(|e| e.at)
    }

    /// First day of the metric window
    pub fn window_start(&self) -> Option<NaiveDate> {
        self.started_at().map(|at| at.date_naive())
    }

    /// Whole days elapsed since the test started
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.started_at()
            .map(|started| (now - started).num_days())
    }

    /// Split the metric history into in-window and out-of-window rows.
    ///
    /// Rows are accepted into the history regardless of date; the window is
    /// only applied at resolution time.
    pub fn partition_by_window(&self) -> (Vec<DailyMetricRow>, Vec<DailyMetricRow>) {
        let Some(start) = self.window_start() else {
            return (Vec::new(), self.metrics.clone());
        };

        self.metrics
            .iter()
            .cloned()
            .partition(|row| self.config.window_contains(start, row.date()))
    }

    // Mutators, used only by the lifecycle service

    /// Apply a transition, rejecting illegal ones and leaving state
    /// untouched on failure. Every applied transition appends a timestamped
    /// history entry.
    pub fn transition_to(
        &mut self,
        target: ExperimentState,
        note: Option<String>,
    ) -> Result<(), DomainError> {
        if !self.state.can_transition_to(target) {
            return Err(DomainError::transition(
                self.state.to_string(),
                target.to_string(),
            ));
        }

        self.state = target;
        self.history.push(TransitionEntry {
            state: target,
            at: Utc::now(),
            note,
        });
        self.touch();
        Ok(())
    }

    /// Merge fetched rows into the history.
    ///
    /// Dedup policy: overwrite by (date, arm) key, so re-fetching the same
    /// range is idempotent and a corrected scrape replaces the stale row.
    pub fn upsert_metrics(&mut self, rows: Vec<DailyMetricRow>) {
        for row in rows {
            match self.metrics.iter_mut().find(|r| r.key() == row.key()) {
                Some(existing) => *existing = row,
                None => self.metrics.push(row),
            }
        }
        self.metrics.sort_by_key(|r| r.key());
        self.touch();
    }

    pub fn set_handle(&mut self, handle: ExperimentHandle) {
        self.handle = Some(handle);
        self.touch();
    }

    pub fn set_eligibility(&mut self, decision: EligibilityDecision) {
        self.eligibility = Some(decision);
        self.touch();
    }

    pub fn set_verdict(&mut self, verdict: Verdict) {
        self.verdict = Some(verdict);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::VariantArm;
    use chrono::Datelike;

    fn record() -> ExperimentRecord {
        ExperimentRecord::new(
            ExperimentId::new("title-test-1").unwrap(),
            Asin::new("B01EXAMPLE").unwrap(),
            Attribute::Title,
            "Old Product Title Here",
            "Optimized Product Title | Key Benefits | Brand Name",
            ExperimentConfig::default(),
        )
        .unwrap()
    }

    fn row(day: u32, arm: VariantArm, impressions: u64) -> DailyMetricRow {
        DailyMetricRow::new(
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            arm,
            impressions,
            impressions / 50,
            0,
        )
        .unwrap()
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_valid_transitions() {
            use ExperimentState::*;
            assert!(Draft.can_transition_to(Validating));
            assert!(Validating.can_transition_to(Blocked));
            assert!(Validating.can_transition_to(Running));
            assert!(Running.can_transition_to(Collecting));
            assert!(Collecting.can_transition_to(Complete));
            assert!(Collecting.can_transition_to(Retest));
        }

        #[test]
        fn test_invalid_transitions() {
            use ExperimentState::*;
            assert!(!Draft.can_transition_to(Collecting));
            assert!(!Draft.can_transition_to(Running));
            assert!(!Validating.can_transition_to(Collecting));
            assert!(!Running.can_transition_to(Complete));
            assert!(!Complete.can_transition_to(Collecting));
        }

        #[test]
        fn test_abandonment_from_any_non_terminal_state() {
            use ExperimentState::*;
            for state in [Draft, Validating, Running, Collecting] {
                assert!(state.can_transition_to(Abandoned), "{state} should abandon");
            }
            for state in [Blocked, Complete, Retest, Abandoned] {
                assert!(!state.can_transition_to(Abandoned), "{state} is terminal");
            }
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = ExperimentConfig::default();
            assert_eq!(config.duration_days, 28);
            assert_eq!(config.control_split_percent, 50);
        }

        #[test]
        fn test_invalid_duration() {
            assert!(ExperimentConfig::new(0, 50).is_err());
            assert!(ExperimentConfig::new(91, 50).is_err());
            assert!(ExperimentConfig::new(28, 50).is_ok());
        }

        #[test]
        fn test_invalid_split() {
            assert!(ExperimentConfig::new(28, 0).is_err());
            assert!(ExperimentConfig::new(28, 100).is_err());
            assert!(ExperimentConfig::new(28, 99).is_ok());
        }

        #[test]
        fn test_window_contains() {
            let config = ExperimentConfig::new(7, 50).unwrap();
            let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

            assert!(config.window_contains(start, start));
            assert!(config.window_contains(start, NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()));
            assert!(!config.window_contains(start, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap()));
            assert!(!config.window_contains(start, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()));
        }
    }

    mod record_tests {
        use super::*;

        #[test]
        fn test_new_record_is_draft_with_history() {
            let record = record();
            assert_eq!(record.state(), ExperimentState::Draft);
            assert_eq!(record.history().len(), 1);
            assert_eq!(record.history()[0].state, ExperimentState::Draft);
        }

        #[test]
        fn test_empty_treatment_rejected() {
            let result = ExperimentRecord::new(
                ExperimentId::new("t").unwrap(),
                Asin::new("B01EXAMPLE").unwrap(),
                Attribute::Title,
                "control",
                "   ",
                ExperimentConfig::default(),
            );
            assert_eq!(result.unwrap_err(), ExperimentValidationError::EmptyTreatment);
        }

        #[test]
        fn test_illegal_transition_leaves_state_unchanged() {
            let mut record = record();
            let err = record.transition_to(ExperimentState::Collecting, None);

            assert!(matches!(err, Err(DomainError::Transition { .. })));
            assert_eq!(record.state(), ExperimentState::Draft);
            assert_eq!(record.history().len(), 1);
        }

        #[test]
        fn test_transitions_append_history() {
            let mut record = record();
            record
                .transition_to(ExperimentState::Validating, None)
                .unwrap();
            record
                .transition_to(ExperimentState::Running, Some("handle issued".to_string()))
                .unwrap();

            assert_eq!(record.state(), ExperimentState::Running);
            assert_eq!(record.history().len(), 3);
            assert_eq!(record.history()[2].note.as_deref(), Some("handle issued"));
            assert!(record.started_at().is_some());
        }

        #[test]
        fn test_upsert_metrics_overwrites_by_key() {
            let mut record = record();

            record.upsert_metrics(vec![
                row(1, VariantArm::Control, 1000),
                row(1, VariantArm::Treatment, 1000),
            ]);
            assert_eq!(record.metrics().len(), 2);

            // Same keys again with corrected numbers: replaced, not appended.
            record.upsert_metrics(vec![row(1, VariantArm::Control, 1200)]);
            assert_eq!(record.metrics().len(), 2);

            let control_row = record
                .metrics()
                .iter()
                .find(|r| r.arm() == VariantArm::Control)
                .unwrap();
            assert_eq!(control_row.impressions(), 1200);
        }

        #[test]
        fn test_upsert_keeps_rows_sorted() {
            let mut record = record();
            record.upsert_metrics(vec![row(5, VariantArm::Control, 100)]);
            record.upsert_metrics(vec![row(2, VariantArm::Control, 100)]);

            let dates: Vec<_> = record.metrics().iter().map(|r| r.date().day()).collect();
            assert_eq!(dates, vec![2, 5]);
        }

        #[test]
        fn test_serialization_round_trip() {
            let mut record = record();
            record
                .transition_to(ExperimentState::Validating, None)
                .unwrap();
            record.transition_to(ExperimentState::Running, None).unwrap();
            record.set_handle(ExperimentHandle::new("EXP_42"));
            record.upsert_metrics(vec![row(1, VariantArm::Control, 1000)]);

            let json = serde_json::to_string_pretty(&record).unwrap();
            let parsed: ExperimentRecord = serde_json::from_str(&json).unwrap();

            assert_eq!(parsed.id(), record.id());
            assert_eq!(parsed.state(), ExperimentState::Running);
            assert_eq!(parsed.history().len(), 3);
            assert_eq!(parsed.metrics().len(), 1);
            assert_eq!(parsed.handle().unwrap().as_str(), "EXP_42");
        }
    }

    #[test]
    fn test_generated_ids_are_valid_and_unique() {
        let a = ExperimentId::generate();
        let b = ExperimentId::generate();
        assert_ne!(a, b);
        assert!(ExperimentId::new(a.as_str()).is_ok());
    }
}
