//! Demo command - drive a full scripted experiment end to end
//!
//! Uses the scripted driver and an in-memory listing, persisting the record
//! to the configured experiments directory so `list` and `report` can pick
//! it up afterwards.

use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use crate::cli::init_logging;
use crate::config::AppConfig;
use crate::domain::driver::{BrowserDriver, Credentials, DateRange};
use crate::domain::experiment::{
    Attribute, DailyMetricRow, ExperimentConfig, ExperimentId, ExperimentState, VariantArm,
    WinnerResolver,
};
use crate::domain::listing::{Asin, ListingCandidate};
use crate::domain::quality::EligibilityGate;
use crate::infrastructure::driver::ScriptedDriver;
use crate::infrastructure::listing::InMemoryListingStore;
use crate::infrastructure::services::{CreateExperimentRequest, ExperimentLifecycle};
use crate::infrastructure::store::JsonFileExperimentRepository;

/// Arguments for the demo command
#[derive(Args, Clone)]
pub struct DemoArgs {
    /// Experiment ID to create
    #[arg(long, default_value = "demo-title-test")]
    pub id: String,

    /// Days of synthetic metrics to generate
    #[arg(long, default_value_t = 7)]
    pub days: u16,
}

/// Run the demo command
pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config);

    let asin = Asin::new("B0DEMO12345")?;
    let listings = Arc::new(InMemoryListingStore::new());
    listings.insert(
        ListingCandidate::new(asin.clone(), "Wireless Earbuds").with_bullets(vec![
            "Patented noise cancelling drivers eliminate background noise so you can \
             focus on music, calls and podcasts anywhere"
                .to_string(),
            "Proven 40 hour battery life with rapid charging helps you avoid dead \
             earbuds on long trips and daily commutes"
                .to_string(),
            "Unique memory foam ear tips reduce pressure and prevent fatigue during \
             all day listening sessions"
                .to_string(),
            "Exclusive studio tuned sound profile improves clarity across bass, mids \
             and treble for every genre"
                .to_string(),
            "Universal Bluetooth pairing connects to phones, tablets and laptops in \
             seconds with a stable signal"
                .to_string(),
        ]),
    )?;

    let driver = Arc::new(ScriptedDriver::new());
    let today = Utc::now().date_naive();
    for day in 0..args.days {
        let date = today + chrono::Days::new(day as u64);
        driver.push_metric_batch(vec![
            DailyMetricRow::new(date, VariantArm::Control, 10_000, 200, 20)?,
            DailyMetricRow::new(date, VariantArm::Treatment, 10_000, 260, 28)?,
        ]);
    }

    let repository = Arc::new(JsonFileExperimentRepository::open(&config.experiments_dir).await?);
    let lifecycle = ExperimentLifecycle::new(
        repository,
        driver.clone(),
        listings,
        EligibilityGate::new(config.gate.clone()),
        WinnerResolver::new(config.resolution.clone()),
    );

    let record = lifecycle
        .create_draft(CreateExperimentRequest {
            id: Some(ExperimentId::new(args.id)?),
            asin,
            attribute: Attribute::Title,
            control_content: None,
            treatment_content: "Premium Wireless Earbuds with Active Noise Cancelling | \
                                40 Hour Battery, IPX7 Waterproof, Bluetooth 5.3 Headphones \
                                for Sports and Travel"
                .to_string(),
            config: ExperimentConfig::default(),
        })
        .await?;
    println!("Drafted {}", record.id());

    let session = driver.login(&Credentials::new("demo-seller", "demo")).await?;
    let record = lifecycle.validate_and_launch(&session, record.id()).await?;

    if record.state() == ExperimentState::Blocked {
        println!("Blocked by the quality gate:");
        if let Some(decision) = record.eligibility() {
            for blocker in decision.blockers() {
                println!("  - {}", blocker);
            }
        }
        return Ok(());
    }
    println!("Launched as {}", record.handle().map(|h| h.as_str()).unwrap_or("?"));

    let range = DateRange::new(today, today + chrono::Days::new(args.days as u64));
    for _ in 0..args.days {
        lifecycle.collect_metrics(&session, record.id(), range).await?;
    }
    println!("Collected {} days of metrics", args.days);

    let record = lifecycle.resolve(record.id(), true).await?;
    let verdict = record
        .verdict()
        .ok_or_else(|| anyhow::anyhow!("resolved record carries no verdict"))?;

    println!();
    println!("Final state:    {}", record.state());
    println!("Winner:         {}", verdict.winner);
    println!("CTR lift:       {:+.2}%", verdict.ctr_lift_percent);
    println!("Recommendation: {}", verdict.recommendation);
    println!();
    println!("Inspect it with: listing-lab report {}", record.id());

    Ok(())
}
