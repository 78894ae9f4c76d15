//! # Boundary Contracts
//!
//! Request and response shapes exchanged with the HTTP layer, plus the pure
//! response aggregator. Wire field names follow the original service
//! contract, including the `orchestationType` spelling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::orchestration::collector::AgentStep;
use crate::orchestration::topology::OrchestrationKind;
use crate::synthesis::{NavigationInstructions, ProductAlternative};

/// Caller coordinates, used in fallback navigation text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Inbound orchestration request.
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestrationRequest {
    pub query: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    pub orchestration: OrchestrationKind,
}

impl OrchestrationRequest {
    /// Boundary validation; the engine itself assumes a non-empty query.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(())
    }
}

/// The assembled result of one orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResponse {
    #[serde(rename = "orchestrationId")]
    pub orchestration_id: Uuid,
    #[serde(rename = "orchestationType")]
    pub orchestration_type: OrchestrationKind,
    #[serde(rename = "orchestrationDescription")]
    pub description: String,
    pub steps: Vec<AgentStep>,
    #[serde(rename = "mermaidWorkflowRepresentation")]
    pub mermaid_workflow_representation: String,
    pub alternatives: Vec<ProductAlternative>,
    #[serde(rename = "navigationInstructions")]
    pub navigation_instructions: NavigationInstructions,
}

impl OrchestrationResponse {
    /// Pure assembly: every input was already resolved upstream, so this has
    /// no failure modes of its own.
    pub fn assemble(
        run_id: Uuid,
        kind: OrchestrationKind,
        steps: Vec<AgentStep>,
        mermaid: String,
        alternatives: Vec<ProductAlternative>,
        navigation: NavigationInstructions,
    ) -> Self {
        Self {
            orchestration_id: run_id,
            orchestration_type: kind,
            description: kind.describe().to_string(),
            steps,
            mermaid_workflow_representation: mermaid,
            alternatives,
            navigation_instructions: navigation,
        }
    }
}
