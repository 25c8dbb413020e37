//! Report command - replay a persisted experiment's metric history

use clap::Args;

use crate::cli::init_logging;
use crate::config::AppConfig;
use crate::domain::experiment::{
    ExperimentId, ExperimentRepository, MetricsAggregator, VariantArm, WinnerResolver,
};
use crate::infrastructure::store::JsonFileExperimentRepository;

/// Arguments for the report command
#[derive(Args, Clone)]
pub struct ReportArgs {
    /// Experiment ID to report on
    pub id: String,
}

/// Run the report command
pub async fn run(args: ReportArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config);

    let repository = JsonFileExperimentRepository::open(&config.experiments_dir).await?;
    let id = ExperimentId::new(args.id)?;
    let record = repository.get(&id).await?;

    println!("Experiment {}", record.id());
    println!("  ASIN:      {}", record.asin());
    println!("  Attribute: {}", record.attribute());
    println!("  State:     {}", record.state());
    println!("  Control:   {}", record.control_content());
    println!("  Treatment: {}", record.treatment_content());
    println!();

    println!("Transitions:");
    for entry in record.history() {
        match &entry.note {
            Some(note) => println!("  {}  {}  ({})", entry.at.format("%Y-%m-%d %H:%M:%S"), entry.state, note),
            None => println!("  {}  {}", entry.at.format("%Y-%m-%d %H:%M:%S"), entry.state),
        }
    }
    println!();

    let (in_window, out_of_window) = record.partition_by_window();
    println!(
        "Metric rows: {} in window, {} outside",
        in_window.len(),
        out_of_window.len()
    );

    let totals = MetricsAggregator::new().aggregate(&in_window);
    for arm in [VariantArm::Control, VariantArm::Treatment] {
        let stats = totals.for_arm(arm);
        println!(
            "  {:<10} impressions {:>8}  clicks {:>6}  units {:>5}  CTR {:.2}%  CVR {:.2}%",
            arm.to_string(),
            stats.impressions,
            stats.clicks,
            stats.units_ordered,
            stats.ctr(),
            stats.cvr()
        );
    }
    println!();

    let resolver = WinnerResolver::new(config.resolution.clone());
    let replayed = resolver.resolve(&totals.control, &totals.treatment);
    println!("Replayed verdict:");
    println!("  Winner:         {}", replayed.winner);
    println!("  CTR lift:       {:+.2}%", replayed.ctr_lift_percent);
    println!("  CVR lift:       {:+.2}%", replayed.cvr_lift_percent);
    println!("  Significant:    {} (p = {:.4})", replayed.significant, replayed.p_value);
    println!("  Recommendation: {}", replayed.recommendation);

    if let Some(stored) = record.verdict() {
        let matches = stored.winner == replayed.winner
            && stored.recommendation == replayed.recommendation
            && stored.significant == replayed.significant;
        println!();
        if matches {
            println!("Stored verdict reproduced by replay");
        } else {
            println!(
                "WARNING: stored verdict ({} / {}) differs from replay",
                stored.winner, stored.recommendation
            );
        }
    }

    Ok(())
}
