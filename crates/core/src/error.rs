//! # Engine Errors
//!
//! Only two failure modes are ever user-visible: an unsupported orchestration
//! kind and a malformed request. Everything else is absorbed into fallback
//! data so the caller always receives a structurally complete response.

use thiserror::Error;

use crate::orchestration::topology::OrchestrationKind;

/// Errors surfaced by the orchestration engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested kind has no builder support (maps to 501 at the boundary).
    #[error("orchestration kind '{0}' is not implemented")]
    UnsupportedOrchestration(OrchestrationKind),

    /// Handoff edge declarations form a cycle; an unbounded walk could hang a run.
    #[error("handoff edges contain a cycle")]
    CyclicHandoff,

    /// A topology names an agent that is not in the registry.
    #[error("agent '{0}' is not registered")]
    UnknownAgent(String),

    /// A topology needs at least one agent.
    #[error("topology requires at least one agent")]
    EmptyTopology,

    /// The caller raised the cancellation signal; the run was aborted,
    /// no partial step log is returned.
    #[error("orchestration run was cancelled")]
    Cancelled,

    /// The topology execution task died unexpectedly.
    #[error("orchestration execution failed: {0}")]
    ExecutionFailed(String),
}

/// Errors raised by an agent capability. Invocation failures are caught by
/// the executor and treated as "no output from this agent".
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent invocation failed: {0}")]
    Invocation(String),

    #[error("could not open agent thread: {0}")]
    Thread(String),
}

/// Boundary validation failure: the request never reaches the engine.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("query must not be empty")]
    EmptyQuery,
}
