//! Usage extraction from model text.

use crate::{Error, Result};

use regex::Regex;
use std::sync::OnceLock;

/// Usage assumed when the model response carries no readable number.
pub const FALLBACK_USAGE_KWH: f64 = 300.0;

/// Extracts a kilowatt-hour figure from free model text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageExtractor;

impl UsageExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Parse the first decimal number in `raw_text`.
    ///
    /// # Returns
    /// * `Ok(f64)` - The first number found
    /// * `Err(Error::Extraction)` - If the text holds no parseable number
    pub fn try_extract(&self, raw_text: &str) -> Result<f64> {
        let found = number_pattern()
            .find(raw_text)
            .ok_or_else(|| Error::extraction(format!("no number in {:?}", truncate(raw_text))))?;

        found
            .as_str()
            .parse::<f64>()
            .map_err(|e| Error::extraction(format!("'{}': {}", found.as_str(), e)))
    }

    /// Parse the first decimal number in `raw_text`, falling back to
    /// [`FALLBACK_USAGE_KWH`] when there is none.
    pub fn extract(&self, raw_text: &str) -> f64 {
        match self.try_extract(raw_text) {
            Ok(kwh) => kwh,
            Err(e) => {
                tracing::warn!(error = %e, fallback = FALLBACK_USAGE_KWH, "Using fallback usage");
                FALLBACK_USAGE_KWH
            }
        }
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d*\.?\d+").expect("valid number pattern"))
}

fn truncate(text: &str) -> String {
    text.chars().take(80).collect()
}
