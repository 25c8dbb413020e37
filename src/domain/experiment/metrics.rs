//! Daily metric rows and cumulative per-variant statistics

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::ExperimentValidationError;

// ============================================================================
// VariantArm
// ============================================================================

/// The two arms of an experiment.
///
/// Deliberately a closed two-member enum rather than a free-form tag, so a
/// third unexpected variant can never be silently ignored downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantArm {
    Control,
    Treatment,
}

impl fmt::Display for VariantArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "control"),
            Self::Treatment => write!(f, "treatment"),
        }
    }
}

// ============================================================================
// DailyMetricRow
// ============================================================================

/// One day of scraped performance numbers for one arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMetricRow {
    date: NaiveDate,
    arm: VariantArm,
    impressions: u64,
    clicks: u64,
    units_ordered: u64,
}

impl DailyMetricRow {
    /// Create a row, enforcing clicks <= impressions.
    ///
    /// Units may exceed clicks: multi-unit orders are permitted.
    pub fn new(
        date: NaiveDate,
        arm: VariantArm,
        impressions: u64,
        clicks: u64,
        units_ordered: u64,
    ) -> Result<Self, ExperimentValidationError> {
        if clicks > impressions {
            return Err(ExperimentValidationError::ClicksExceedImpressions {
                clicks,
                impressions,
            });
        }

        Ok(Self {
            date,
            arm,
            impressions,
            clicks,
            units_ordered,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn arm(&self) -> VariantArm {
        self.arm
    }

    pub fn impressions(&self) -> u64 {
        self.impressions
    }

    pub fn clicks(&self) -> u64 {
        self.clicks
    }

    pub fn units_ordered(&self) -> u64 {
        self.units_ordered
    }

    /// Dedup key for append idempotence
    pub fn key(&self) -> (NaiveDate, VariantArm) {
        (self.date, self.arm)
    }
}

// ============================================================================
// AggregateStats
// ============================================================================

/// Cumulative totals for one arm with derived rate statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub impressions: u64,
    pub clicks: u64,
    pub units_ordered: u64,
}

impl AggregateStats {
    fn add_row(&mut self, row: &DailyMetricRow) {
        self.impressions += row.impressions();
        self.clicks += row.clicks();
        self.units_ordered += row.units_ordered();
    }

    /// Click-through rate in percent; 0 with no impressions
    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            return 0.0;
        }
        self.clicks as f64 / self.impressions as f64 * 100.0
    }

    /// Conversion rate in percent; 0 with no clicks
    pub fn cvr(&self) -> f64 {
        if self.clicks == 0 {
            return 0.0;
        }
        self.units_ordered as f64 / self.clicks as f64 * 100.0
    }
}

/// Aggregates for both arms of an experiment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmTotals {
    pub control: AggregateStats,
    pub treatment: AggregateStats,
}

impl ArmTotals {
    pub fn for_arm(&self, arm: VariantArm) -> &AggregateStats {
        match arm {
            VariantArm::Control => &self.control,
            VariantArm::Treatment => &self.treatment,
        }
    }
}

// ============================================================================
// MetricsAggregator
// ============================================================================

/// Reduces a row set into per-arm cumulative statistics.
///
/// Order-insensitive and idempotent: the same row set always yields the same
/// totals, with no hidden counters. Window filtering is the lifecycle's
/// policy, not the aggregator's; every row handed in is summed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsAggregator;

impl MetricsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Partition by arm, then sum
    pub fn aggregate(&self, rows: &[DailyMetricRow]) -> ArmTotals {
        let mut totals = ArmTotals::default();

        for row in rows {
            match row.arm() {
                VariantArm::Control => totals.control.add_row(row),
                VariantArm::Treatment => totals.treatment.add_row(row),
            }
        }

        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn row(day: u32, arm: VariantArm, impressions: u64, clicks: u64, units: u64) -> DailyMetricRow {
        DailyMetricRow::new(date(day), arm, impressions, clicks, units).unwrap()
    }

    mod row_tests {
        use super::*;

        #[test]
        fn test_clicks_bounded_by_impressions() {
            let err = DailyMetricRow::new(date(1), VariantArm::Control, 100, 101, 0);
            assert_eq!(
                err,
                Err(ExperimentValidationError::ClicksExceedImpressions {
                    clicks: 101,
                    impressions: 100
                })
            );
        }

        #[test]
        fn test_units_may_exceed_clicks() {
            // Multi-unit orders: 5 clicks, 12 units
            let row = DailyMetricRow::new(date(1), VariantArm::Treatment, 100, 5, 12);
            assert!(row.is_ok());
        }

        #[test]
        fn test_row_serialization() {
            let row = row(3, VariantArm::Control, 500, 10, 2);
            let json = serde_json::to_string(&row).unwrap();
            assert!(json.contains("\"arm\":\"control\""));

            let parsed: DailyMetricRow = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, row);
        }
    }

    mod stats_tests {
        use super::*;

        #[test]
        fn test_ctr_and_cvr() {
            let stats = AggregateStats {
                impressions: 10_000,
                clicks: 200,
                units_ordered: 20,
            };
            assert!((stats.ctr() - 2.0).abs() < 1e-9);
            assert!((stats.cvr() - 10.0).abs() < 1e-9);
        }

        #[test]
        fn test_zero_denominators() {
            let empty = AggregateStats::default();
            assert_eq!(empty.ctr(), 0.0);
            assert_eq!(empty.cvr(), 0.0);

            let no_clicks = AggregateStats {
                impressions: 100,
                clicks: 0,
                units_ordered: 0,
            };
            assert_eq!(no_clicks.cvr(), 0.0);
        }
    }

    mod aggregator_tests {
        use super::*;

        #[test]
        fn test_partitions_interleaved_unordered_rows() {
            let aggregator = MetricsAggregator::new();
            let rows = vec![
                row(3, VariantArm::Treatment, 1000, 30, 4),
                row(1, VariantArm::Control, 1000, 20, 2),
                row(2, VariantArm::Treatment, 1000, 26, 3),
                row(2, VariantArm::Control, 1000, 22, 1),
            ];

            let totals = aggregator.aggregate(&rows);

            assert_eq!(totals.control.impressions, 2000);
            assert_eq!(totals.control.clicks, 42);
            assert_eq!(totals.control.units_ordered, 3);
            assert_eq!(totals.treatment.impressions, 2000);
            assert_eq!(totals.treatment.clicks, 56);
            assert_eq!(totals.treatment.units_ordered, 7);
        }

        #[test]
        fn test_idempotent_over_same_row_set() {
            let aggregator = MetricsAggregator::new();
            let rows = vec![
                row(1, VariantArm::Control, 500, 10, 1),
                row(1, VariantArm::Treatment, 500, 12, 2),
            ];

            assert_eq!(aggregator.aggregate(&rows), aggregator.aggregate(&rows));
        }

        #[test]
        fn test_empty_rows() {
            let totals = MetricsAggregator::new().aggregate(&[]);
            assert_eq!(totals, ArmTotals::default());
        }

        #[test]
        fn test_for_arm_lookup() {
            let aggregator = MetricsAggregator::new();
            let rows = vec![row(1, VariantArm::Control, 100, 5, 1)];
            let totals = aggregator.aggregate(&rows);

            assert_eq!(totals.for_arm(VariantArm::Control).impressions, 100);
            assert_eq!(totals.for_arm(VariantArm::Treatment).impressions, 0);
        }
    }
}
