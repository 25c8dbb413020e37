//! Quality scoring and eligibility gating
//!
//! A candidate listing is scored across six weighted dimensions; the
//! resulting composite and grade feed the eligibility gate that decides
//! whether the listing may consume live test capacity.

mod dimension;
mod engine;
mod gate;
mod result;
pub mod text;

pub use dimension::{Dimension, DimensionScore, Grade};
pub use engine::ScoreEngine;
pub use gate::{EligibilityDecision, EligibilityGate, GatePolicy};
pub use result::QualityResult;
