//! # Result Synthesizers
//!
//! Post-processors that turn the raw step output of a designated agent into
//! strongly typed domain results. Generative output is inherently unreliable,
//! so every failure path (missing step, empty result, malformed JSON, failed
//! invariant) resolves to a deterministic fallback. A synthesizer never
//! errors; downstream consumers always get a structurally valid object.

pub mod alternatives;
pub mod navigation;

pub use alternatives::{AlternativesSynthesizer, ProductAlternative};
pub use navigation::{Landmark, NavigationInstructions, NavigationStep, NavigationSynthesizer};

use serde::de::DeserializeOwned;

use crate::orchestration::collector::AgentStep;

/// First non-empty result recorded for the designated agent.
pub(crate) fn designated_result<'a>(steps: &'a [AgentStep], agent_id: &str) -> Option<&'a str> {
    steps
        .iter()
        .find(|step| step.agent_id == agent_id)
        .map(|step| step.result.as_str())
        .filter(|result| !result.trim().is_empty())
}

/// Strict decode with one lenient retry: generative agents routinely wrap
/// JSON in markdown fences, so a failed strict decode is retried on the
/// fenced body before giving up.
pub(crate) fn parse_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }
    serde_json::from_str(strip_code_fences(raw)).ok()
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.strip_suffix("```") {
        Some(body) => body.trim(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn step(agent_id: &str, result: &str) -> AgentStep {
        AgentStep {
            agent_id: agent_id.to_string(),
            action: "test".to_string(),
            result: result.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn designated_result_picks_first_matching_step() {
        let steps = vec![
            step("finder", "one"),
            step("navigator", "two"),
            step("navigator", "three"),
        ];
        assert_eq!(designated_result(&steps, "navigator"), Some("two"));
    }

    #[test]
    fn empty_or_missing_results_are_none() {
        let steps = vec![step("navigator", "   ")];
        assert_eq!(designated_result(&steps, "navigator"), None);
        assert_eq!(designated_result(&steps, "finder"), None);
    }

    #[test]
    fn parse_json_handles_fenced_payloads() {
        let fenced = "```json\n{\"a\": 1}\n```";
        let value: Option<serde_json::Value> = parse_json(fenced);
        assert_eq!(value.unwrap()["a"], 1);

        let bare_fence = "```\n[1, 2]\n```";
        let value: Option<Vec<i32>> = parse_json(bare_fence);
        assert_eq!(value.unwrap(), vec![1, 2]);
    }

    #[test]
    fn parse_json_rejects_garbage() {
        let value: Option<serde_json::Value> = parse_json("not json at all");
        assert!(value.is_none());
    }
}
