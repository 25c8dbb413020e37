//! CLI module for listing-lab
//!
//! Provides subcommands for working with listings and experiments:
//! - `score`: score a candidate listing and print the gate decision
//! - `list`: list persisted experiments and their states
//! - `report`: replay a persisted experiment and print its verdict
//! - `demo`: drive a full scripted experiment end to end

pub mod demo;
pub mod list;
pub mod report;
pub mod score;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// listing-lab - A/B listing experiments with a quality gate
#[derive(Parser)]
#[command(name = "listing-lab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score a candidate listing and print the eligibility decision
    Score(score::ScoreArgs),

    /// List persisted experiments and their states
    List,

    /// Replay a persisted experiment's metrics and print its report
    Report(report::ReportArgs),

    /// Run a full scripted experiment end to end
    Demo(demo::DemoArgs),
}

pub(crate) fn init_logging(config: &AppConfig) {
    logging::init_logging(&config.logging);
}
