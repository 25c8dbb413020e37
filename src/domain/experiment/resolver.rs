//! Winner resolution over aggregated experiment statistics

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::{AggregateStats, ArmTotals};

// ============================================================================
// Winner / Recommendation
// ============================================================================

/// Winning arm of a resolved experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Control,
    Treatment,
    None,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "CONTROL"),
            Self::Treatment => write!(f, "TREATMENT"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Action recommended by the resolver.
///
/// `Retest` is a normal outcome, never an error: it covers both
/// insufficient data and statistically inconclusive results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Adopt,
    Rollback,
    Retest,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adopt => write!(f, "ADOPT"),
            Self::Rollback => write!(f, "ROLLBACK"),
            Self::Retest => write!(f, "RETEST"),
        }
    }
}

// ============================================================================
// Verdict
// ============================================================================

/// Statistically grounded outcome of an experiment.
///
/// Carries the aggregates it was derived from so the persisted record is a
/// replayable audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Winner,
    pub ctr_lift_percent: f64,
    pub cvr_lift_percent: f64,
    pub significant: bool,
    pub p_value: f64,
    pub recommendation: Recommendation,
    pub totals: ArmTotals,
}

// ============================================================================
// ResolutionPolicy
// ============================================================================

/// Sample-size and confidence configuration for winner resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionPolicy {
    /// Minimum impressions per arm before any verdict is attempted
    #[serde(default = "ResolutionPolicy::default_min_sample_size")]
    pub min_sample_size: u64,
    /// Confidence level for the two-proportion test (e.g. 0.95)
    #[serde(default = "ResolutionPolicy::default_confidence_level")]
    pub confidence_level: f64,
}

impl ResolutionPolicy {
    fn default_min_sample_size() -> u64 {
        100
    }

    fn default_confidence_level() -> f64 {
        0.95
    }
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            min_sample_size: Self::default_min_sample_size(),
            confidence_level: Self::default_confidence_level(),
        }
    }
}

// ============================================================================
// WinnerResolver
// ============================================================================

/// Converts accumulated statistics into a verdict.
///
/// Significance comes from a two-tailed two-proportion z-test over the
/// click/impression counts (pooled proportion, normal approximation) at the
/// configured confidence level; the minimum sample size is a necessary but
/// not sufficient precondition.
#[derive(Debug, Clone, Default)]
pub struct WinnerResolver {
    policy: ResolutionPolicy,
}

impl WinnerResolver {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    /// Resolve a verdict from per-arm aggregates
    pub fn resolve(&self, control: &AggregateStats, treatment: &AggregateStats) -> Verdict {
        let totals = ArmTotals {
            control: *control,
            treatment: *treatment,
        };

        // Insufficient data overrides all lift computation.
        if control.impressions < self.policy.min_sample_size
            || treatment.impressions < self.policy.min_sample_size
        {
            return Verdict {
                winner: Winner::None,
                ctr_lift_percent: 0.0,
                cvr_lift_percent: 0.0,
                significant: false,
                p_value: 1.0,
                recommendation: Recommendation::Retest,
                totals,
            };
        }

        let ctr_lift = lift_percent(control.ctr(), treatment.ctr());
        let cvr_lift = lift_percent(control.cvr(), treatment.cvr());

        let p_value = two_proportion_p_value(
            control.clicks,
            control.impressions,
            treatment.clicks,
            treatment.impressions,
        )
        .unwrap_or(1.0);
        let significant = p_value < 1.0 - self.policy.confidence_level;

        // Strict inequality on CTR lift: an exact tie can never adopt.
        let (winner, recommendation) = if significant && ctr_lift > 0.0 && cvr_lift >= 0.0 {
            (Winner::Treatment, Recommendation::Adopt)
        } else if significant && (ctr_lift < 0.0 || cvr_lift < 0.0) {
            (Winner::Control, Recommendation::Rollback)
        } else {
            (Winner::None, Recommendation::Retest)
        };

        Verdict {
            winner,
            ctr_lift_percent: ctr_lift,
            cvr_lift_percent: cvr_lift,
            significant,
            p_value,
            recommendation,
            totals,
        }
    }
}

/// Relative lift in percent; 0 when the control rate is 0
fn lift_percent(control_rate: f64, treatment_rate: f64) -> f64 {
    if control_rate == 0.0 {
        return 0.0;
    }
    (treatment_rate - control_rate) / control_rate * 100.0
}

/// Two-tailed p-value of a two-proportion z-test over click counts.
///
/// Returns `None` when the pooled proportion is degenerate (0 or 1) or an
/// arm has no impressions, in which case no significance can be claimed.
fn two_proportion_p_value(
    control_clicks: u64,
    control_impressions: u64,
    treatment_clicks: u64,
    treatment_impressions: u64,
) -> Option<f64> {
    if control_impressions == 0 || treatment_impressions == 0 {
        return None;
    }

    let n1 = control_impressions as f64;
    let n2 = treatment_impressions as f64;
    let p1 = control_clicks as f64 / n1;
    let p2 = treatment_clicks as f64 / n2;

    let pooled = (control_clicks + treatment_clicks) as f64 / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();

    if se == 0.0 {
        return None;
    }

    let z = (p2 - p1) / se;
    Some(2.0 * (1.0 - normal_cdf(z.abs())))
}

/// Standard normal cumulative distribution function
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Error function approximation
///
/// Uses Horner's method for the polynomial approximation.
/// Accurate to about 1.5e-7.
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(impressions: u64, clicks: u64, units: u64) -> AggregateStats {
        AggregateStats {
            impressions,
            clicks,
            units_ordered: units,
        }
    }

    #[test]
    fn test_normal_cdf_known_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 0.001);
        assert!(normal_cdf(3.0) > 0.998);
        assert!(normal_cdf(-3.0) < 0.002);
    }

    #[test]
    fn test_two_proportion_degenerate_cases() {
        assert!(two_proportion_p_value(0, 0, 10, 100).is_none());
        // Zero clicks on both arms: pooled proportion 0, no test possible
        assert!(two_proportion_p_value(0, 1000, 0, 1000).is_none());
    }

    #[test]
    fn test_clear_difference_has_low_p_value() {
        let p = two_proportion_p_value(200, 10_000, 260, 10_000).unwrap();
        assert!(p < 0.01, "expected strong significance, got p = {p}");
    }

    #[test]
    fn test_near_identical_rates_have_high_p_value() {
        let p = two_proportion_p_value(200, 10_000, 202, 10_000).unwrap();
        assert!(p > 0.5, "expected no significance, got p = {p}");
    }

    #[test]
    fn test_large_sample_treatment_win_adopts() {
        // Control CTR 2.0%, treatment 2.6% (+30% lift); CVR 10.0% vs 10.77%.
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 200, 20), &stats(10_000, 260, 28));

        assert_eq!(verdict.winner, Winner::Treatment);
        assert_eq!(verdict.recommendation, Recommendation::Adopt);
        assert!(verdict.significant);
        assert!((verdict.ctr_lift_percent - 30.0).abs() < 1e-9);
        assert!(verdict.cvr_lift_percent > 0.0);
    }

    #[test]
    fn test_insufficient_sample_forces_retest() {
        // Huge lift on tiny samples still retests.
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(50, 1, 0), &stats(50, 10, 5));

        assert_eq!(verdict.winner, Winner::None);
        assert_eq!(verdict.recommendation, Recommendation::Retest);
        assert!(!verdict.significant);
        assert_eq!(verdict.ctr_lift_percent, 0.0);
        assert_eq!(verdict.cvr_lift_percent, 0.0);
    }

    #[test]
    fn test_insufficient_sample_on_one_arm_only() {
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 200, 20), &stats(99, 5, 1));
        assert_eq!(verdict.recommendation, Recommendation::Retest);
    }

    #[test]
    fn test_exact_ctr_tie_cannot_adopt() {
        // Identical CTR (lift exactly 0) with better CVR: not an adopt, and
        // not a control win either since treatment did not underperform.
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 200, 20), &stats(10_000, 200, 21));

        assert_eq!(verdict.ctr_lift_percent, 0.0);
        assert!(verdict.cvr_lift_percent > 0.0);
        assert_eq!(verdict.winner, Winner::None);
        assert_eq!(verdict.recommendation, Recommendation::Retest);
    }

    #[test]
    fn test_significant_underperformance_rolls_back() {
        // Treatment CTR well below control on a large sample.
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 260, 28), &stats(10_000, 180, 15));

        assert_eq!(verdict.winner, Winner::Control);
        assert_eq!(verdict.recommendation, Recommendation::Rollback);
        assert!(verdict.significant);
        assert!(verdict.ctr_lift_percent < 0.0);
    }

    #[test]
    fn test_small_insignificant_lift_retests() {
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 200, 20), &stats(10_000, 205, 21));

        assert_eq!(verdict.winner, Winner::None);
        assert_eq!(verdict.recommendation, Recommendation::Retest);
        assert!(!verdict.significant);
        assert!(verdict.ctr_lift_percent > 0.0);
    }

    #[test]
    fn test_zero_control_ctr_yields_zero_lift() {
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 0, 0), &stats(10_000, 50, 5));

        // Lift is defined as 0 when the control rate is 0; the z-test can
        // still find the difference significant, but a 0 CTR lift never
        // satisfies the strict adopt condition.
        assert_eq!(verdict.ctr_lift_percent, 0.0);
        assert_ne!(verdict.recommendation, Recommendation::Adopt);
    }

    #[test]
    fn test_verdict_serialization() {
        let resolver = WinnerResolver::default();
        let verdict = resolver.resolve(&stats(10_000, 200, 20), &stats(10_000, 260, 28));

        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"winner\":\"TREATMENT\""));
        assert!(json.contains("\"recommendation\":\"ADOPT\""));

        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.winner, verdict.winner);
        assert_eq!(parsed.recommendation, verdict.recommendation);
    }
}
