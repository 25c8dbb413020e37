//! Composite quality result

use serde::{Deserialize, Serialize};

use super::dimension::{Dimension, DimensionScore, Grade};

/// Weighted composite score across all six dimensions.
///
/// Always built fresh from a full set of dimension scores; the composite is
/// never cached across listing edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResult {
    composite: f64,
    grade: Grade,
    dimensions: Vec<DimensionScore>,
}

impl QualityResult {
    /// Compute the composite and grade from dimension scores
    pub fn from_dimensions(dimensions: Vec<DimensionScore>) -> Self {
        let composite: f64 = dimensions.iter().map(|d| d.weighted()).sum();
        Self {
            composite,
            grade: Grade::from_composite(composite),
            dimensions,
        }
    }

    pub fn composite(&self) -> f64 {
        self.composite
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn dimensions(&self) -> &[DimensionScore] {
        &self.dimensions
    }

    /// Look up a single dimension's score
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension() == dimension)
    }

    /// The lowest-scoring dimension, compliance excluded.
    ///
    /// Used by the eligibility gate to name the most actionable weakness.
    pub fn weakest_non_compliance(&self) -> Option<&DimensionScore> {
        self.dimensions
            .iter()
            .filter(|d| d.dimension() != Dimension::Compliance)
            .min_by(|a, b| a.value().total_cmp(&b.value()))
    }

    /// Whether the compliance dimension carries a critical flag
    pub fn has_critical_compliance(&self) -> bool {
        self.dimension(Dimension::Compliance)
            .is_some_and(|d| d.is_critical())
    }
}
