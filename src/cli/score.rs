//! Score command - quality-score a candidate listing

use clap::Args;

use crate::cli::init_logging;
use crate::config::AppConfig;
use crate::domain::listing::{Asin, ListingCandidate};
use crate::domain::quality::{EligibilityGate, ScoreEngine};

/// Arguments for the score command
#[derive(Args, Clone)]
pub struct ScoreArgs {
    /// Read the candidate from a JSON file instead of inline arguments
    #[arg(long, conflicts_with_all = ["asin", "title"])]
    pub file: Option<std::path::PathBuf>,

    /// Catalog key of the listing
    #[arg(long, required_unless_present = "file")]
    pub asin: Option<String>,

    /// Candidate title
    #[arg(long, required_unless_present = "file")]
    pub title: Option<String>,

    /// Candidate bullet points (repeatable)
    #[arg(long = "bullet")]
    pub bullets: Vec<String>,

    /// Candidate description
    #[arg(long)]
    pub description: Option<String>,
}

/// Run the score command
pub async fn run(args: ScoreArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config);

    let candidate = load_candidate(&args)?;

    let engine = ScoreEngine::new();
    let gate = EligibilityGate::new(config.gate);
    let decision = gate.evaluate(engine.score(&candidate));
    let result = decision.result();

    println!("Listing {}", candidate.asin());
    println!();
    for score in result.dimensions() {
        println!(
            "  {:<22} {:>5.1} (weight {:.2})",
            score.dimension().label(),
            score.value(),
            score.weight()
        );
        for issue in score.issues() {
            println!("      - {}", issue);
        }
    }
    println!();
    println!("  Composite: {:.1}  Grade: {}", result.composite(), result.grade());
    println!();

    if decision.is_eligible() {
        println!("ELIGIBLE for live testing");
    } else {
        println!("BLOCKED:");
        for blocker in decision.blockers() {
            println!("  - {}", blocker);
        }
    }
    for recommendation in decision.recommendations() {
        println!("  hint: {}", recommendation);
    }

    Ok(())
}

fn load_candidate(args: &ScoreArgs) -> anyhow::Result<ListingCandidate> {
    if let Some(path) = &args.file {
        let json = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&json)?);
    }

    // clap guarantees both are present when --file is absent
    let asin = args.asin.as_deref().unwrap_or_default();
    let title = args.title.as_deref().unwrap_or_default();

    let mut candidate = ListingCandidate::new(Asin::new(asin)?, title)
        .with_bullets(args.bullets.clone());
    if let Some(description) = &args.description {
        candidate = candidate.with_description(description);
    }
    Ok(candidate)
}
