//! List command - show persisted experiments

use crate::cli::init_logging;
use crate::config::AppConfig;
use crate::domain::experiment::ExperimentRepository;
use crate::infrastructure::store::JsonFileExperimentRepository;

/// Run the list command
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config);

    let repository = JsonFileExperimentRepository::open(&config.experiments_dir).await?;
    let records = repository.list().await?;

    if records.is_empty() {
        println!("No experiments under {}", config.experiments_dir.display());
        return Ok(());
    }

    println!(
        "{:<30} {:<12} {:<12} {:<12} {}",
        "ID", "STATE", "ASIN", "ATTRIBUTE", "UPDATED"
    );
    for record in records {
        println!(
            "{:<30} {:<12} {:<12} {:<12} {}",
            record.id(),
            record.state().to_string(),
            record.asin().to_string(),
            record.attribute().to_string(),
            record.updated_at().format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
