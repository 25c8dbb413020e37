//! Experiment lifecycle service
//!
//! Orchestrates the state machine over the repository, the browser driver
//! and the listing store. Per-record writes are serialized through an async
//! mutex registry; the mutex is never held across a driver call, so a slow
//! console interaction cannot stall unrelated records. The Validating state
//! itself guards against a second concurrent launch of the same record.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::domain::driver::{BrowserDriver, CreateExperimentSpec, DateRange, Session};
use crate::domain::experiment::{
    Attribute, ExperimentConfig, ExperimentId, ExperimentRecord, ExperimentRepository,
    ExperimentState, MetricsAggregator, Recommendation, Verdict, WinnerResolver,
};
use crate::domain::listing::{Asin, ListingCandidate, ListingStore};
use crate::domain::quality::{EligibilityGate, ScoreEngine};
use crate::domain::DomainError;

// ============================================================================
// CreateExperimentRequest
// ============================================================================

/// Input for drafting a new experiment.
///
/// When `control_content` is absent, the live listing's current value for
/// the attribute under test is used as the control arm.
#[derive(Debug, Clone)]
pub struct CreateExperimentRequest {
    pub id: Option<ExperimentId>,
    pub asin: Asin,
    pub attribute: Attribute,
    pub control_content: Option<String>,
    pub treatment_content: String,
    pub config: ExperimentConfig,
}

// ============================================================================
// ExperimentLifecycle
// ============================================================================

/// The orchestrating state machine for listing experiments
#[derive(Debug)]
pub struct ExperimentLifecycle {
    repository: Arc<dyn ExperimentRepository>,
    driver: Arc<dyn BrowserDriver>,
    listings: Arc<dyn ListingStore>,
    engine: ScoreEngine,
    gate: EligibilityGate,
    aggregator: MetricsAggregator,
    resolver: WinnerResolver,
    locks: Mutex<HashMap<ExperimentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ExperimentLifecycle {
    pub fn new(
        repository: Arc<dyn ExperimentRepository>,
        driver: Arc<dyn BrowserDriver>,
        listings: Arc<dyn ListingStore>,
        gate: EligibilityGate,
        resolver: WinnerResolver,
    ) -> Self {
        Self {
            repository,
            driver,
            listings,
            engine: ScoreEngine::new(),
            gate,
            aggregator: MetricsAggregator::new(),
            resolver,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Per-record write lock. The registry mutex is held only long enough
    /// to clone the entry.
    fn lock_for(&self, id: &ExperimentId) -> Result<Arc<tokio::sync::Mutex<()>>, DomainError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| DomainError::storage(format!("Failed to acquire lock registry: {}", e)))?;

        Ok(locks.entry(id.clone()).or_default().clone())
    }

    /// Validate inputs and persist a Draft. No side effects beyond storage.
    pub async fn create_draft(
        &self,
        request: CreateExperimentRequest,
    ) -> Result<ExperimentRecord, DomainError> {
        let control_content = match request.control_content {
            Some(content) => content,
            None => {
                let listing = self.listings.get_listing(&request.asin).await?;
                current_attribute_value(&listing, request.attribute)?
            }
        };

        let id = request.id.unwrap_or_else(ExperimentId::generate);
        let record = ExperimentRecord::new(
            id,
            request.asin,
            request.attribute,
            control_content,
            request.treatment_content,
            request.config,
        )
        .map_err(|e| DomainError::validation(e.to_string()))?;

        self.repository.create(&record).await?;
        info!(id = %record.id(), asin = %record.asin(), attribute = %record.attribute(), "Drafted experiment");
        Ok(record)
    }

    /// Run the quality gate and, on a pass, materialize the live test.
    ///
    /// A failing gate moves the record to Blocked without touching the
    /// driver. A driver failure leaves the record in Validating with no
    /// automatic retry; the caller may abandon it.
    pub async fn validate_and_launch(
        &self,
        session: &Session,
        id: &ExperimentId,
    ) -> Result<ExperimentRecord, DomainError> {
        let lock = self.lock_for(id)?;

        // Fetch the live listing before taking the record lock
        let listing = {
            let record = self.repository.get(id).await?;
            self.listings.get_listing(record.asin()).await?
        };

        // Gate under the record lock. Scoring is pure, so no slow work
        // happens while the lock is held.
        let launch_spec = {
            let _guard = lock.lock().await;
            let mut record = self.repository.get(id).await?;

            record.transition_to(ExperimentState::Validating, None)?;

            let candidate =
                apply_treatment(&listing, record.attribute(), record.treatment_content());
            let decision = self.gate.evaluate(self.engine.score(&candidate));
            let eligible = decision.is_eligible();
            let note = if eligible {
                None
            } else {
                Some(decision.blockers().join("; "))
            };
            record.set_eligibility(decision);

            if !eligible {
                record.transition_to(ExperimentState::Blocked, note)?;
                self.repository.update(&record).await?;
                info!(id = %id, "Experiment blocked by eligibility gate");
                return Ok(record);
            }

            self.repository.update(&record).await?;
            CreateExperimentSpec {
                asin: record.asin().clone(),
                attribute: record.attribute(),
                control_content: record.control_content().to_string(),
                treatment_content: record.treatment_content().to_string(),
                config: *record.config(),
            }
        };

        // Driver call happens outside the lock; the Validating state keeps
        // a second launch of this record out.
        let handle = self.driver.create_experiment(session, &launch_spec).await?;

        let _guard = lock.lock().await;
        let mut record = self.repository.get(id).await?;
        record.set_handle(handle.clone());
        record.transition_to(ExperimentState::Running, Some(format!("handle {}", handle)))?;
        self.repository.update(&record).await?;

        info!(id = %id, handle = %handle, "Experiment launched");
        Ok(record)
    }

    /// Fetch daily metrics over a range and merge them into the record.
    ///
    /// First call moves Running to Collecting; re-invocation while
    /// Collecting is idempotent thanks to the keyed dedup on append.
    pub async fn collect_metrics(
        &self,
        session: &Session,
        id: &ExperimentId,
        range: DateRange,
    ) -> Result<ExperimentRecord, DomainError> {
        let record = self.repository.get(id).await?;

        // State legality first: a Draft record has no handle either, but the
        // illegal transition is the more precise refusal.
        match record.state() {
            ExperimentState::Running | ExperimentState::Collecting => {}
            other => {
                return Err(DomainError::transition(
                    other.to_string(),
                    ExperimentState::Collecting.to_string(),
                ))
            }
        }

        let handle = match record.handle() {
            Some(handle) => handle.clone(),
            None => {
                return Err(DomainError::validation(format!(
                    "Experiment {} has no driver handle",
                    id
                )))
            }
        };

        // Fetch outside the lock, merge under it.
        let rows = self.driver.fetch_daily_metrics(session, &handle, range).await?;
        debug!(id = %id, rows = rows.len(), "Fetched metric rows");

        let lock = self.lock_for(id)?;
        let _guard = lock.lock().await;
        let mut record = self.repository.get(id).await?;

        if record.state() == ExperimentState::Running {
            record.transition_to(ExperimentState::Collecting, None)?;
        } else if record.state() != ExperimentState::Collecting {
            return Err(DomainError::transition(
                record.state().to_string(),
                ExperimentState::Collecting.to_string(),
            ));
        }

        record.upsert_metrics(rows);
        self.repository.update(&record).await?;
        Ok(record)
    }

    /// Resolve a Collecting experiment into Complete or Retest.
    ///
    /// Refused while the configured duration has not elapsed unless
    /// `force` is set. Out-of-window rows are excluded from the verdict
    /// and reported, never silently dropped.
    pub async fn resolve(
        &self,
        id: &ExperimentId,
        force: bool,
    ) -> Result<ExperimentRecord, DomainError> {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock().await;
        let mut record = self.repository.get(id).await?;

        if record.state() != ExperimentState::Collecting {
            return Err(DomainError::transition(
                record.state().to_string(),
                ExperimentState::Complete.to_string(),
            ));
        }

        let duration = record.config().duration_days as i64;
        let elapsed = record.elapsed_days(Utc::now()).unwrap_or(0);
        if !force && elapsed < duration {
            return Err(DomainError::validation(format!(
                "Experiment {} has {} of {} days elapsed; use force to resolve early",
                id, elapsed, duration
            )));
        }

        let (in_window, out_of_window) = record.partition_by_window();
        if !out_of_window.is_empty() {
            warn!(
                id = %id,
                excluded = out_of_window.len(),
                "Excluding out-of-window metric rows from verdict"
            );
        }

        let totals = self.aggregator.aggregate(&in_window);
        let verdict = self.resolver.resolve(&totals.control, &totals.treatment);

        let target = match verdict.recommendation {
            Recommendation::Adopt | Recommendation::Rollback => ExperimentState::Complete,
            Recommendation::Retest => ExperimentState::Retest,
        };
        let note = format!(
            "{} (winner {}, p {:.4})",
            verdict.recommendation, verdict.winner, verdict.p_value
        );

        record.set_verdict(verdict);
        record.transition_to(target, Some(note))?;
        self.repository.update(&record).await?;

        info!(id = %id, state = %record.state(), "Experiment resolved");
        Ok(record)
    }

    /// Abandon a non-terminal experiment
    pub async fn abandon(
        &self,
        id: &ExperimentId,
        note: Option<String>,
    ) -> Result<ExperimentRecord, DomainError> {
        let lock = self.lock_for(id)?;
        let _guard = lock.lock().await;
        let mut record = self.repository.get(id).await?;

        record.transition_to(ExperimentState::Abandoned, note)?;
        self.repository.update(&record).await?;

        info!(id = %id, "Experiment abandoned");
        Ok(record)
    }

    /// Re-derive a verdict from the persisted metric history.
    ///
    /// For a resolved record this must reproduce the stored verdict; the
    /// record is a replayable audit trail.
    pub fn replay_verdict(&self, record: &ExperimentRecord) -> Verdict {
        let (in_window, _) = record.partition_by_window();
        let totals = self.aggregator.aggregate(&in_window);
        self.resolver.resolve(&totals.control, &totals.treatment)
    }

    pub async fn get(&self, id: &ExperimentId) -> Result<ExperimentRecord, DomainError> {
        self.repository.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<ExperimentRecord>, DomainError> {
        self.repository.list().await
    }
}

/// The live listing with the treatment substituted into the attribute under
/// test. A title test is judged in the context of the listing's current
/// bullets and description, not as a bare title.
fn apply_treatment(
    listing: &ListingCandidate,
    attribute: Attribute,
    treatment: &str,
) -> ListingCandidate {
    let mut title = listing.title().to_string();
    let mut bullets = listing.bullets().to_vec();
    let mut description = listing.description().to_string();

    if let Some(slot) = attribute.bullet_slot() {
        if bullets.len() < slot {
            bullets.resize(slot, String::new());
        }
        bullets[slot - 1] = treatment.to_string();
    } else if attribute == Attribute::Title {
        title = treatment.to_string();
    } else {
        description = treatment.to_string();
    }

    ListingCandidate::new(listing.asin().clone(), title)
        .with_bullets(bullets)
        .with_description(description)
}

/// Current value of one attribute on a live listing, used as the default
/// control arm
fn current_attribute_value(
    listing: &ListingCandidate,
    attribute: Attribute,
) -> Result<String, DomainError> {
    if let Some(slot) = attribute.bullet_slot() {
        return listing.bullets().get(slot - 1).cloned().ok_or_else(|| {
            DomainError::validation(format!(
                "Listing {} has no bullet {} to use as control",
                listing.asin(),
                slot
            ))
        });
    }

    if attribute == Attribute::Title {
        return Ok(listing.title().to_string());
    }

    if listing.description().trim().is_empty() {
        return Err(DomainError::validation(format!(
            "Listing {} has no description to use as control",
            listing.asin()
        )));
    }
    Ok(listing.description().to_string())
}
