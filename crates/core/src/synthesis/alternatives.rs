//! # Alternatives Synthesizer
//!
//! Converts the designated agent's output into a list of
//! [`ProductAlternative`] records, or two canned substitutes on failure.

use serde::{Deserialize, Serialize};

use crate::orchestration::collector::AgentStep;

use super::{designated_result, parse_json};

/// Placeholder shelf used by fallback records.
const FALLBACK_LOCATION: &str = "Main floor";
const FALLBACK_AISLE: i32 = 12;
const FALLBACK_SECTION: &str = "Outdoor Essentials";

/// A substitute product suggestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductAlternative {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub in_stock: bool,
    pub is_available: bool,
    pub location: String,
    pub aisle: i32,
    pub section: String,
}

impl ProductAlternative {
    /// An alternative counts only with a non-empty name and sku.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.sku.trim().is_empty()
    }
}

/// Synthesizes product alternatives from the step log.
#[derive(Debug, Clone)]
pub struct AlternativesSynthesizer {
    agent_id: String,
}

impl AlternativesSynthesizer {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
        }
    }

    /// Strict-then-fallback synthesis. The parsed list is accepted as-is if
    /// at least one entry is valid; anything else resolves to the canned
    /// fallback. Never errors.
    pub fn synthesize(&self, steps: &[AgentStep], query: &str) -> Vec<ProductAlternative> {
        if let Some(raw) = designated_result(steps, &self.agent_id) {
            if let Some(parsed) = parse_json::<Vec<ProductAlternative>>(raw) {
                if parsed.iter().any(ProductAlternative::is_valid) {
                    return parsed;
                }
                tracing::debug!(agent = %self.agent_id, "no valid alternatives in output, using fallback");
            } else {
                tracing::debug!(agent = %self.agent_id, "alternatives output failed to parse, using fallback");
            }
        }
        Self::fallback(query)
    }

    /// Two canned in-stock substitutes at a fixed placeholder location.
    fn fallback(query: &str) -> Vec<ProductAlternative> {
        vec![
            ProductAlternative {
                name: format!("All-Season Substitute for {query}"),
                sku: "SUB-0001".to_string(),
                price: 29.99,
                in_stock: true,
                is_available: true,
                location: FALLBACK_LOCATION.to_string(),
                aisle: FALLBACK_AISLE,
                section: FALLBACK_SECTION.to_string(),
            },
            ProductAlternative {
                name: "Outfitter House Brand Alternative".to_string(),
                sku: "SUB-0002".to_string(),
                price: 19.99,
                in_stock: true,
                is_available: true,
                location: FALLBACK_LOCATION.to_string(),
                aisle: FALLBACK_AISLE,
                section: FALLBACK_SECTION.to_string(),
            },
        ]
    }
}
