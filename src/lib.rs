//! listing-lab
//!
//! A/B experimentation for e-commerce listings with a quality gate:
//! - Six-dimension weighted quality scoring with letter grades
//! - Eligibility gating before any live test consumes traffic
//! - Experiment lifecycle over a browser-automation driver
//! - Metric aggregation and statistical winner determination

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
