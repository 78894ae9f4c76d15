//! # Outfitter Core
//!
//! Multi-agent workflow orchestration engine for the Outfitter in-store
//! concierge. Given a compound query ("find camping products, match them to a
//! customer, and navigate to them"), the engine builds an execution topology
//! over a set of opaque agents, streams execution events while it runs,
//! reduces them into an ordered step log, and synthesizes strongly typed
//! navigation and product-alternative results with guaranteed fallbacks.
//!
//! ## Architecture
//!
//! - `agents/` - the opaque `AgentCapability` seam and explicit registry
//! - `orchestration/` - topology builder, executor, step collector, engine
//! - `synthesis/` - navigation and product-alternative synthesizers
//! - `response` - boundary request/response contracts and the aggregator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use outfitter_core::orchestration::{Orchestrator, OrchestratorConfig};
//!
//! let orchestrator = Orchestrator::new(config, registry);
//! let response = orchestrator.run(&request).await?;
//! ```

pub mod agents;
pub mod error;
pub mod orchestration;
pub mod response;
pub mod synthesis;
