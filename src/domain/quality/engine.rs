//! Six-dimension listing score engine

use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::collections::HashSet;

use super::dimension::{Dimension, DimensionScore};
use super::result::QualityResult;
use super::text;
use crate::domain::listing::ListingCandidate;

/// Differentiation / proof-claim vocabulary
const USP_KEYWORDS: [&str; 6] = ["unique", "patented", "exclusive", "only", "first", "proven"];

/// Pain-point / purchase-intent vocabulary
const PAIN_POINT_KEYWORDS: [&str; 6] =
    ["solve", "eliminate", "prevent", "avoid", "reduce", "improve"];

/// Terms that trigger a critical compliance flag
const BANNED_TERMS: [&str; 4] = ["#1", "best seller", "free shipping", "100% guarantee"];

/// Generic commerce vocabulary used as the distinctiveness reference corpus
static GENERIC_VOCAB: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "for", "with", "of", "to", "in", "on", "your", "our",
        "new", "best", "quality", "premium", "great", "product", "products", "buy", "top",
        "high", "set", "pack", "size", "color", "easy", "use", "made", "durable", "perfect",
        "ideal", "includes", "designed", "fit", "fits", "this", "that", "is", "are", "it",
        "you", "from", "by", "at", "as", "all", "more", "value",
    ]
    .into_iter()
    .collect()
});

/// Computes per-dimension scores and the weighted composite for a listing.
///
/// Pure: identical input always yields an identical result. A dimension that
/// cannot be evaluated scores 0 but is never omitted from the weighted sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreEngine;

impl ScoreEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score a listing across all six dimensions
    pub fn score(&self, listing: &ListingCandidate) -> QualityResult {
        QualityResult::from_dimensions(vec![
            score_keyword_optimization(listing),
            score_usp_effectiveness(listing),
            score_readability(listing),
            score_competitive_position(listing),
            score_customer_alignment(listing),
            score_compliance(listing),
        ])
    }
}

fn unevaluable(dimension: Dimension) -> DimensionScore {
    DimensionScore::new(dimension, 0.0).with_issue("no content to evaluate")
}

/// Keyword coverage and placement: title length band plus bullet coverage.
fn score_keyword_optimization(listing: &ListingCandidate) -> DimensionScore {
    if listing.is_empty() {
        return unevaluable(Dimension::KeywordOptimization);
    }

    let title_len = listing.title().chars().count();
    let bullet_len: usize = listing.bullets().iter().map(|b| b.chars().count()).sum();

    let mut value = 0.0;
    let mut issues = Vec::new();

    if title_len > 80 && title_len <= 200 {
        value += 50.0;
    } else {
        issues.push(format!(
            "title length {title_len} outside the 81-200 character band"
        ));
    }

    if bullet_len > 500 {
        value += 50.0;
    } else {
        issues.push(format!(
            "bullet copy totals {bullet_len} characters, below the 500 character coverage target"
        ));
    }

    let mut score = DimensionScore::new(Dimension::KeywordOptimization, value);
    for issue in issues {
        score = score.with_issue(issue);
    }
    score
}

/// Differentiation and proof-claim language in the bullets.
fn score_usp_effectiveness(listing: &ListingCandidate) -> DimensionScore {
    if listing.is_empty() {
        return unevaluable(Dimension::UspEffectiveness);
    }

    let hits = keyword_hits(listing.bullets(), &USP_KEYWORDS);
    let value = (hits as f64 * 20.0 + 40.0).min(100.0);

    let score = DimensionScore::new(Dimension::UspEffectiveness, value);
    if hits == 0 {
        score.with_issue("no differentiation language detected in bullets")
    } else {
        score
    }
}

/// Reading ease blended with structural-clarity checks on the title.
fn score_readability(listing: &ListingCandidate) -> DimensionScore {
    if listing.is_empty() {
        return unevaluable(Dimension::Readability);
    }

    // Terminate title and bullets so each counts as its own sentence.
    let mut prose = format!("{}.", listing.title());
    for bullet in listing.bullets() {
        prose.push(' ');
        prose.push_str(bullet);
        prose.push('.');
    }
    if !listing.description().is_empty() {
        prose.push(' ');
        prose.push_str(listing.description());
    }

    let ease = text::flesch_reading_ease(&prose).unwrap_or(0.0);

    let title_len = listing.title().chars().count();
    let mut structural = 0.0;
    let mut issues = Vec::new();

    if (100..=180).contains(&title_len) {
        structural += 15.0;
    } else {
        issues.push(format!(
            "title length {title_len} outside the 100-180 clarity band"
        ));
    }

    if listing.title().contains(['|', ',', '-']) {
        structural += 15.0;
    } else {
        issues.push("title has no separator structure".to_string());
    }

    let mut score = DimensionScore::new(Dimension::Readability, ease * 0.7 + structural);
    for issue in issues {
        score = score.with_issue(issue);
    }
    score
}

/// Lexical distinctiveness against the generic commerce vocabulary.
fn score_competitive_position(listing: &ListingCandidate) -> DimensionScore {
    if listing.is_empty() {
        return unevaluable(Dimension::CompetitivePosition);
    }

    let unique: BTreeSet<String> = text::tokenize(&listing.combined_text()).into_iter().collect();
    if unique.is_empty() {
        return unevaluable(Dimension::CompetitivePosition);
    }

    let distinctive = unique
        .iter()
        .filter(|t| !GENERIC_VOCAB.contains(t.as_str()))
        .count();
    let ratio = distinctive as f64 / unique.len() as f64;

    let score = DimensionScore::new(Dimension::CompetitivePosition, 40.0 + ratio * 60.0);
    if ratio < 0.3 {
        score.with_issue("copy leans heavily on generic commerce vocabulary")
    } else {
        score
    }
}

/// Overlap with known pain-point and purchase-intent vocabulary.
fn score_customer_alignment(listing: &ListingCandidate) -> DimensionScore {
    if listing.is_empty() {
        return unevaluable(Dimension::CustomerAlignment);
    }

    let hits = keyword_hits(listing.bullets(), &PAIN_POINT_KEYWORDS);
    let value = (hits as f64 * 15.0 + 40.0).min(100.0);

    let score = DimensionScore::new(Dimension::CustomerAlignment, value);
    if hits == 0 {
        score.with_issue("no pain-point language detected in bullets")
    } else {
        score
    }
}

/// Banned-term and formatting scan.
///
/// Any banned-term hit sets the critical flag independent of the numeric
/// value; formatting violations lower the value only.
fn score_compliance(listing: &ListingCandidate) -> DimensionScore {
    if listing.is_empty() {
        return unevaluable(Dimension::Compliance);
    }

    let blob = listing.combined_text().to_lowercase();
    let mut violations = 0;
    let mut critical = false;
    let mut issues = Vec::new();

    for term in BANNED_TERMS {
        if blob.contains(term) {
            violations += 1;
            critical = true;
            issues.push(format!("banned term: {term}"));
        }
    }

    let alpha: Vec<char> = listing.title().chars().filter(|c| c.is_alphabetic()).collect();
    if alpha.len() >= 10 && alpha.iter().all(|c| c.is_uppercase()) {
        violations += 1;
        issues.push("title is entirely uppercase".to_string());
    }

    let value = match violations {
        0 => 100.0,
        1 => 80.0,
        _ => 60.0,
    };

    let mut score = DimensionScore::new(Dimension::Compliance, value);
    for issue in issues {
        score = score.with_issue(issue);
    }
    if critical {
        score = score.with_critical();
    }
    score
}

fn keyword_hits(bullets: &[String], keywords: &[&str]) -> usize {
    bullets
        .iter()
        .map(|bullet| {
            let lower = bullet.to_lowercase();
            keywords.iter().filter(|k| lower.contains(**k)).count()
        })
        .sum()
}
