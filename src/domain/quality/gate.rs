//! Eligibility gate over a quality result

use serde::{Deserialize, Serialize};

use super::result::QualityResult;

/// Score a dimension must reach to avoid an improvement recommendation
const RECOMMENDATION_FLOOR: f64 = 60.0;

// ============================================================================
// GatePolicy
// ============================================================================

/// Threshold policy for the eligibility gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePolicy {
    /// Minimum composite score for live-test eligibility
    #[serde(default = "GatePolicy::default_min_composite")]
    pub min_composite: f64,
}

impl GatePolicy {
    fn default_min_composite() -> f64 {
        70.0
    }
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            min_composite: Self::default_min_composite(),
        }
    }
}

// ============================================================================
// EligibilityDecision
// ============================================================================

/// Accept/block decision for a candidate listing.
///
/// A blocked decision is a structured, expected outcome, not an error; it
/// always names the failing dimension(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityDecision {
    eligible: bool,
    result: QualityResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    blockers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    recommendations: Vec<String>,
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    pub fn result(&self) -> &QualityResult {
        &self.result
    }

    pub fn blockers(&self) -> &[String] {
        &self.blockers
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

// ============================================================================
// EligibilityGate
// ============================================================================

/// Deterministic gate combining three independent conditions:
/// composite above threshold, passing grade, and no critical compliance
/// flags. A listing clearing the threshold can still be blocked by a
/// critical compliance hit.
#[derive(Debug, Clone, Default)]
pub struct EligibilityGate {
    policy: GatePolicy,
}

impl EligibilityGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }

    /// Evaluate a quality result against the gate policy
    pub fn evaluate(&self, result: QualityResult) -> EligibilityDecision {
        let composite_ok = result.composite() >= self.policy.min_composite;
        let grade_ok = result.grade().is_passing();
        let compliance_ok = !result.has_critical_compliance();

        let mut blockers = Vec::new();

        if !composite_ok {
            let mut blocker = format!(
                "composite {:.1} below eligibility threshold {:.0}",
                result.composite(),
                self.policy.min_composite
            );
            if let Some(weakest) = result.weakest_non_compliance() {
                blocker.push_str(&format!(
                    "; weakest dimension: {} ({:.0}/100)",
                    weakest.dimension(),
                    weakest.value()
                ));
            }
            blockers.push(blocker);
        }

        if !grade_ok {
            blockers.push(format!("grade {} is not eligible", result.grade()));
        }

        if !compliance_ok {
            let issues = result
                .dimension(super::Dimension::Compliance)
                .map(|d| d.issues().join(", "))
                .unwrap_or_default();
            blockers.push(format!("compliance: {issues}"));
        }

        let recommendations = result
            .dimensions()
            .iter()
            .filter(|d| d.value() < RECOMMENDATION_FLOOR)
            .map(|d| format!("Improve {}: score {:.0}/100", d.dimension(), d.value()))
            .collect();

        EligibilityDecision {
            eligible: composite_ok && grade_ok && compliance_ok,
            result,
            blockers,
            recommendations,
        }
    }
}
