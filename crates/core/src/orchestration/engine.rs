//! # Orchestrator
//!
//! The top-level engine: builds the topology for a request, drives it,
//! reduces the event stream into the step log, and synthesizes the typed
//! results. Every run owns its own context, step list, and topology; nothing
//! is cached or shared across runs.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::agents::AgentRegistry;
use crate::error::EngineError;
use crate::response::{GeoPoint, OrchestrationRequest, OrchestrationResponse};
use crate::synthesis::{AlternativesSynthesizer, NavigationSynthesizer};

use super::collector::{self, AgentStep};
use super::events::ExecutionEvent;
use super::executor::{self, DEFAULT_HANDOFF_STEP_BUDGET};
use super::topology::{OrchestrationKind, Topology, TopologyOptions, DEFAULT_GROUP_CHAT_TURNS};

/// Configuration for one orchestrator instance.
///
/// The designated-agent mapping for the synthesizers lives here, supplied by
/// the assembler rather than hardcoded in synthesizer logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Ordered agent ids driven by every run.
    pub agents: Vec<String>,
    /// Directed handoff edges; empty means chain the agents in order.
    #[serde(default)]
    pub handoff_edges: Vec<(String, String)>,
    /// Turn cap for group chat runs.
    pub max_group_chat_turns: usize,
    /// Step budget bounding a handoff walk.
    pub handoff_step_budget: usize,
    /// Agent whose output feeds the navigation synthesizer.
    pub navigation_agent: String,
    /// Agent whose output feeds the alternatives synthesizer.
    pub alternatives_agent: String,
    /// Label recorded on every collected step.
    pub step_action: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            handoff_edges: Vec::new(),
            max_group_chat_turns: DEFAULT_GROUP_CHAT_TURNS,
            handoff_step_budget: DEFAULT_HANDOFF_STEP_BUDGET,
            navigation_agent: "navigation".to_string(),
            alternatives_agent: "alternatives".to_string(),
            step_action: "Processed orchestration request".to_string(),
        }
    }
}

/// Request-scoped context threaded through one run.
///
/// Replaces per-request mutable fields on a shared instance; concurrent runs
/// never observe each other's state.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub query: String,
    pub location: Option<GeoPoint>,
}

impl RunContext {
    fn for_request(request: &OrchestrationRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query: request.query.clone(),
            location: request.location,
        }
    }
}

/// The orchestration engine.
pub struct Orchestrator {
    config: OrchestratorConfig,
    registry: AgentRegistry,
    event_tx: Option<mpsc::Sender<ExecutionEvent>>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, registry: AgentRegistry) -> Self {
        Self {
            config,
            registry,
            event_tx: None,
        }
    }

    /// Set a channel that receives every execution event live, for UIs or
    /// log streaming. The step log is built regardless.
    pub fn with_event_channel(mut self, tx: mpsc::Sender<ExecutionEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one orchestration to completion.
    ///
    /// Only [`EngineError::UnsupportedOrchestration`] and topology build
    /// failures surface as errors; agent failures and malformed output are
    /// absorbed into synthesizer fallbacks.
    #[tracing::instrument(skip(self, request), fields(kind = %request.orchestration))]
    pub async fn run(
        &self,
        request: &OrchestrationRequest,
    ) -> Result<OrchestrationResponse, EngineError> {
        let ctx = RunContext::for_request(request);
        let topology = self.build_topology(request.orchestration)?;
        let mermaid = topology.to_mermaid();

        tracing::info!(run_id = %ctx.run_id, "orchestration run started");

        let handle = executor::execute_with_budget(
            topology,
            self.registry.clone(),
            ctx.query.clone(),
            self.config.handoff_step_budget,
        );
        let steps = collector::collect_tapped(
            handle.events,
            &self.config.step_action,
            self.event_tx.as_ref(),
        )
        .await;
        handle
            .task
            .await
            .map_err(|error| EngineError::ExecutionFailed(error.to_string()))?;

        tracing::info!(run_id = %ctx.run_id, steps = steps.len(), "orchestration run finished");
        Ok(self.finish(ctx, request.orchestration, steps, mermaid))
    }

    /// Like [`Orchestrator::run`], aborting with [`EngineError::Cancelled`]
    /// when the cancellation signal fires. A hard abort: no partial step log
    /// is returned.
    pub async fn run_cancellable(
        &self,
        request: &OrchestrationRequest,
        mut cancel: oneshot::Receiver<()>,
    ) -> Result<OrchestrationResponse, EngineError> {
        // A dropped sender means the caller opted out of cancellation, not
        // that the run should abort.
        let cancelled = async {
            match (&mut cancel).await {
                Ok(()) => (),
                Err(_) => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            () = cancelled => {
                tracing::warn!("orchestration run cancelled");
                Err(EngineError::Cancelled)
            }
            response = self.run(request) => response,
        }
    }

    fn build_topology(&self, kind: OrchestrationKind) -> Result<Topology, EngineError> {
        for id in &self.config.agents {
            if !self.registry.contains(id) {
                return Err(EngineError::UnknownAgent(id.clone()));
            }
        }
        let options = TopologyOptions {
            handoff_edges: self.config.handoff_edges.clone(),
            max_turns: Some(self.config.max_group_chat_turns),
        };
        Topology::build(kind, &self.config.agents, &options)
    }

    fn finish(
        &self,
        ctx: RunContext,
        kind: OrchestrationKind,
        steps: Vec<AgentStep>,
        mermaid: String,
    ) -> OrchestrationResponse {
        let navigation = NavigationSynthesizer::new(&self.config.navigation_agent).synthesize(
            &steps,
            &ctx.query,
            ctx.location.as_ref(),
        );
        let alternatives = AlternativesSynthesizer::new(&self.config.alternatives_agent)
            .synthesize(&steps, &ctx.query);
        OrchestrationResponse::assemble(ctx.run_id, kind, steps, mermaid, alternatives, navigation)
    }
}
