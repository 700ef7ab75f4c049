//! Neighborhood Extraction from Free-Text Addresses

use crate::config::NeighborhoodConfig;
use crate::error::CleanError;
use regex::Regex;
use std::collections::HashMap;

/// Derives the neighborhood (bairro) from an address string.
///
/// Listing addresses look like `"Rua X, 100 - Gonzaga, Santos"` or, without a
/// street, `"Boqueirão, Santos"`. The segment after `" -"` and before the next
/// comma is preferred; otherwise the text before the first comma is used.
pub struct NeighborhoodExtractor {
    dashed: Regex,
    leading: Regex,
    substitutions: HashMap<String, String>,
}

impl NeighborhoodExtractor {
    pub fn new(config: &NeighborhoodConfig) -> Result<Self, CleanError> {
        Ok(Self {
            dashed: Regex::new(r" -\s*([^,]+),")?,
            leading: Regex::new(r"^([^,]+),")?,
            substitutions: config
                .substitutions
                .iter()
                .map(|s| (s.from.clone(), s.to.clone()))
                .collect(),
        })
    }

    /// Neighborhood for `address`, or `None` when neither pattern matches
    pub fn extract(&self, address: &str) -> Option<String> {
        let captured = self
            .dashed
            .captures(address)
            .or_else(|| self.leading.captures(address))?;
        let name = captured.get(1)?.as_str().trim();
        if name.is_empty() {
            return None;
        }
        Some(
            self.substitutions
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string()),
        )
    }
}
