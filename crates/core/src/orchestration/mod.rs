//! # Workflow Orchestration
//!
//! Builds and runs multi-agent execution topologies.
//!
//! ## Run Flow
//!
//! ```text
//! Request → Topology Builder → Topology Executor → Step Collector → Synthesizers → Response
//! ```

pub mod collector;
pub mod engine;
pub mod events;
pub mod executor;
pub mod topology;

pub use collector::AgentStep;
pub use engine::{Orchestrator, OrchestratorConfig, RunContext};
pub use events::{AgentMessage, ExecutionEvent};
pub use executor::{ExecutionHandle, DEFAULT_HANDOFF_STEP_BUDGET};
pub use topology::{
    OrchestrationKind, Topology, TopologyOptions, DEFAULT_GROUP_CHAT_TURNS,
};
