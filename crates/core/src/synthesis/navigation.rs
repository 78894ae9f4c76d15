//! # Navigation Synthesizer
//!
//! Converts the designated navigation agent's output into
//! [`NavigationInstructions`], or deterministic fallback directions built
//! from the query and caller location.

use serde::{Deserialize, Serialize};

use crate::orchestration::collector::AgentStep;
use crate::response::GeoPoint;

use super::{designated_result, parse_json};

/// Fixed estimate used on the fallback path.
const FALLBACK_ESTIMATE: &str = "about 2 minutes";

/// A landmark referenced by a navigation step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Landmark {
    pub description: String,
    pub location: String,
}

/// One instruction in a walking route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationStep {
    pub direction: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<Landmark>,
}

/// A full route to the target product area.
/// Invariant: at least one step on success, at least two on fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationInstructions {
    pub start_location: String,
    pub estimated_time: String,
    pub steps: Vec<NavigationStep>,
}

/// Synthesizes navigation instructions from the step log.
///
/// The designated agent id is caller configuration, not hardcoded here.
#[derive(Debug, Clone)]
pub struct NavigationSynthesizer {
    agent_id: String,
}

impl NavigationSynthesizer {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
        }
    }

    /// Strict-then-fallback synthesis. Never errors: a missing step, empty
    /// result, malformed JSON, or empty step list all resolve to the
    /// deterministic fallback route.
    pub fn synthesize(
        &self,
        steps: &[AgentStep],
        query: &str,
        location: Option<&GeoPoint>,
    ) -> NavigationInstructions {
        if let Some(raw) = designated_result(steps, &self.agent_id) {
            if let Some(parsed) = parse_json::<NavigationInstructions>(raw) {
                if !parsed.steps.is_empty() {
                    return parsed;
                }
                tracing::debug!(agent = %self.agent_id, "navigation output had no steps, using fallback");
            } else {
                tracing::debug!(agent = %self.agent_id, "navigation output failed to parse, using fallback");
            }
        }
        Self::fallback(query, location)
    }

    /// Two guaranteed steps: head toward the queried item's area, then arrive.
    fn fallback(query: &str, location: Option<&GeoPoint>) -> NavigationInstructions {
        let start_location = match location {
            Some(point) => format!("your position ({:.4}, {:.4})", point.lat, point.lon),
            None => "the store entrance".to_string(),
        };
        NavigationInstructions {
            start_location: start_location.clone(),
            estimated_time: FALLBACK_ESTIMATE.to_string(),
            steps: vec![
                NavigationStep {
                    direction: "forward".to_string(),
                    description: format!(
                        "Head from {start_location} toward the area stocking {query}."
                    ),
                    landmark: None,
                },
                NavigationStep {
                    direction: "arrive".to_string(),
                    description: format!("You have arrived at the section for {query}."),
                    landmark: None,
                },
            ],
        }
    }
}
