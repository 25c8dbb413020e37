//! Quality dimensions and per-dimension scores

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Dimension
// ============================================================================

/// The six fixed quality dimensions.
///
/// Weights are fixed constants summing to exactly 1.0; every scoring pass
/// evaluates all six, never a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    KeywordOptimization,
    UspEffectiveness,
    Readability,
    CompetitivePosition,
    CustomerAlignment,
    Compliance,
}

impl Dimension {
    /// All six dimensions in scoring order
    pub const ALL: [Dimension; 6] = [
        Dimension::KeywordOptimization,
        Dimension::UspEffectiveness,
        Dimension::Readability,
        Dimension::CompetitivePosition,
        Dimension::CustomerAlignment,
        Dimension::Compliance,
    ];

    /// Fixed weight of this dimension in the composite
    pub fn weight(&self) -> f64 {
        match self {
            Self::KeywordOptimization => 0.25,
            Self::UspEffectiveness => 0.20,
            Self::Readability => 0.15,
            Self::CompetitivePosition => 0.15,
            Self::CustomerAlignment => 0.15,
            Self::Compliance => 0.10,
        }
    }

    /// Human-readable name used in gate decisions and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::KeywordOptimization => "keyword optimization",
            Self::UspEffectiveness => "USP effectiveness",
            Self::Readability => "readability",
            Self::CompetitivePosition => "competitive position",
            Self::CustomerAlignment => "customer alignment",
            Self::Compliance => "compliance",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// DimensionScore
// ============================================================================

/// Score for a single dimension, created fresh per scoring call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    dimension: Dimension,
    value: f64,
    weight: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
    #[serde(default)]
    critical: bool,
}

impl DimensionScore {
    /// Create a score, clamping the value to [0, 100]
    pub fn new(dimension: Dimension, value: f64) -> Self {
        Self {
            dimension,
            value: value.clamp(0.0, 100.0),
            weight: dimension.weight(),
            issues: Vec::new(),
            critical: false,
        }
    }

    /// Attach a flagged issue
    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    /// Mark this score as carrying a critical flag.
    ///
    /// Only the compliance dimension ever sets this.
    pub fn with_critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Contribution of this dimension to the composite
    pub fn weighted(&self) -> f64 {
        self.value * self.weight
    }
}

// ============================================================================
// Grade
// ============================================================================

/// Letter grade derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Derive the grade from a composite score
    pub fn from_composite(composite: f64) -> Self {
        if composite >= 90.0 {
            Self::A
        } else if composite >= 80.0 {
            Self::B
        } else if composite >= 70.0 {
            Self::C
        } else if composite >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    /// Grades eligible for live testing
    pub fn is_passing(&self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        write!(f, "{letter}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod dimension_tests {
        use super::*;

        #[test]
        fn test_weights_sum_to_one() {
            let sum: f64 = Dimension::ALL.iter().map(|d| d.weight()).sum();
            assert!((sum - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn test_all_covers_six_distinct_dimensions() {
            let mut labels: Vec<_> = Dimension::ALL.iter().map(|d| d.label()).collect();
            labels.sort_unstable();
            labels.dedup();
            assert_eq!(labels.len(), 6);
        }
    }

    mod dimension_score_tests {
        use super::*;

        #[test]
        fn test_value_clamped() {
            let score = DimensionScore::new(Dimension::Readability, 140.0);
            assert_eq!(score.value(), 100.0);

            let score = DimensionScore::new(Dimension::Readability, -5.0);
            assert_eq!(score.value(), 0.0);
        }

        #[test]
        fn test_weight_copied_from_dimension() {
            let score = DimensionScore::new(Dimension::KeywordOptimization, 50.0);
            assert_eq!(score.weight(), 0.25);
            assert_eq!(score.weighted(), 12.5);
        }

        #[test]
        fn test_critical_flag() {
            let score = DimensionScore::new(Dimension::Compliance, 80.0)
                .with_issue("banned term: best seller")
                .with_critical();
            assert!(score.is_critical());
            assert_eq!(score.issues().len(), 1);
        }
    }

    mod grade_tests {
        use super::*;

        #[test]
        fn test_grade_boundaries() {
            assert_eq!(Grade::from_composite(100.0), Grade::A);
            assert_eq!(Grade::from_composite(90.0), Grade::A);
            assert_eq!(Grade::from_composite(89.9), Grade::B);
            assert_eq!(Grade::from_composite(80.0), Grade::B);
            assert_eq!(Grade::from_composite(79.9), Grade::C);
            assert_eq!(Grade::from_composite(70.0), Grade::C);
            assert_eq!(Grade::from_composite(69.9), Grade::D);
            assert_eq!(Grade::from_composite(60.0), Grade::D);
            assert_eq!(Grade::from_composite(59.9), Grade::F);
            assert_eq!(Grade::from_composite(0.0), Grade::F);
        }

        #[test]
        fn test_passing_grades() {
            assert!(Grade::A.is_passing());
            assert!(Grade::B.is_passing());
            assert!(Grade::C.is_passing());
            assert!(!Grade::D.is_passing());
            assert!(!Grade::F.is_passing());
        }
    }
}
