//! Candidate listing content

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length for catalog keys
pub const MAX_ASIN_LENGTH: usize = 20;

/// Validation errors for listing inputs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingValidationError {
    #[error("ASIN cannot be empty")]
    EmptyAsin,

    #[error("ASIN exceeds maximum length of {0} characters")]
    AsinTooLong(usize),

    #[error("ASIN contains invalid character: '{0}'")]
    InvalidAsinCharacter(char),
}

// ============================================================================
// Asin
// ============================================================================

/// Catalog key identifying a product listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asin(String);

impl Asin {
    /// Create a new ASIN with validation
    pub fn new(asin: impl Into<String>) -> Result<Self, ListingValidationError> {
        let asin = asin.into();

        if asin.is_empty() {
            return Err(ListingValidationError::EmptyAsin);
        }

        if asin.len() > MAX_ASIN_LENGTH {
            return Err(ListingValidationError::AsinTooLong(MAX_ASIN_LENGTH));
        }

        for ch in asin.chars() {
            if !ch.is_ascii_alphanumeric() {
                return Err(ListingValidationError::InvalidAsinCharacter(ch));
            }
        }

        Ok(Self(asin))
    }

    /// Get the ASIN as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Asin {
    type Error = ListingValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Asin> for String {
    fn from(asin: Asin) -> Self {
        asin.0
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Asin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ListingCandidate
// ============================================================================

/// Candidate listing content submitted for quality scoring.
///
/// Immutable input to the score engine; the core never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCandidate {
    asin: Asin,
    title: String,
    #[serde(default)]
    bullets: Vec<String>,
    #[serde(default)]
    description: String,
}

impl ListingCandidate {
    /// Create a new candidate with a title only
    pub fn new(asin: Asin, title: impl Into<String>) -> Self {
        Self {
            asin,
            title: title.into(),
            bullets: Vec::new(),
            description: String::new(),
        }
    }

    /// Set the bullet points
    pub fn with_bullets(mut self, bullets: Vec<String>) -> Self {
        self.bullets = bullets;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Get the ASIN
    pub fn asin(&self) -> &Asin {
        &self.asin
    }

    /// Get the title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the bullet points
    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    /// Get the description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check whether the candidate carries no text at all
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty()
            && self.bullets.iter().all(|b| b.trim().is_empty())
            && self.description.trim().is_empty()
    }

    /// All text fields joined into a single blob, for lexical scans
    pub fn combined_text(&self) -> String {
        let mut text = self.title.clone();
        for bullet in &self.bullets {
            text.push(' ');
            text.push_str(bullet);
        }
        if !self.description.is_empty() {
            text.push(' ');
            text.push_str(&self.description);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod asin_tests {
        use super::*;

        #[test]
        fn test_valid_asin() {
            let asin = Asin::new("B01EXAMPLE").unwrap();
            assert_eq!(asin.as_str(), "B01EXAMPLE");
        }

        #[test]
        fn test_empty_asin() {
            assert_eq!(Asin::new(""), Err(ListingValidationError::EmptyAsin));
        }

        #[test]
        fn test_asin_too_long() {
            let long = "A".repeat(21);
            assert_eq!(
                Asin::new(long),
                Err(ListingValidationError::AsinTooLong(20))
            );
        }

        #[test]
        fn test_asin_invalid_character() {
            assert_eq!(
                Asin::new("B01-EXAMPLE"),
                Err(ListingValidationError::InvalidAsinCharacter('-'))
            );
        }

        #[test]
        fn test_asin_serialization() {
            let asin = Asin::new("B01EXAMPLE").unwrap();
            let json = serde_json::to_string(&asin).unwrap();
            assert_eq!(json, "\"B01EXAMPLE\"");

            let parsed: Asin = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, asin);
        }
    }

    mod candidate_tests {
        use super::*;

        #[test]
        fn test_candidate_builder() {
            let candidate = ListingCandidate::new(Asin::new("B01EXAMPLE").unwrap(), "Headphones")
                .with_bullets(vec!["Noise cancelling".to_string()])
                .with_description("Premium audio.");

            assert_eq!(candidate.title(), "Headphones");
            assert_eq!(candidate.bullets().len(), 1);
            assert_eq!(candidate.description(), "Premium audio.");
            assert!(!candidate.is_empty());
        }

        #[test]
        fn test_empty_candidate() {
            let candidate = ListingCandidate::new(Asin::new("B01EXAMPLE").unwrap(), "  ");
            assert!(candidate.is_empty());
        }

        #[test]
        fn test_combined_text() {
            let candidate = ListingCandidate::new(Asin::new("B01EXAMPLE").unwrap(), "Title")
                .with_bullets(vec!["one".to_string(), "two".to_string()]);
            assert_eq!(candidate.combined_text(), "Title one two");
        }
    }
}
