//! # Agent Capabilities
//!
//! The seam between the orchestration engine and the task executors it
//! drives. An agent is an opaque capability: given a prompt on a conversation
//! thread it runs to completion and returns text (often JSON). The engine
//! never inspects how the reply was produced and never mutates an agent.
//!
//! Agents are resolved through an explicit [`AgentRegistry`] passed into each
//! run rather than an ambient keyed lookup, so a run owns exactly the agents
//! it names.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AgentError;

/// Opaque handle for one conversation thread on an agent.
///
/// The engine creates a fresh thread per invocation and never manages the
/// thread lifecycle beyond that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentThread(Uuid);

impl AgentThread {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for AgentThread {
    fn default() -> Self {
        Self::new()
    }
}

/// Text produced by a single agent invocation.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
}

/// An opaque request/response task executor.
#[async_trait]
pub trait AgentCapability: Send + Sync {
    /// Stable identity used in topologies, step logs, and synthesizer config.
    fn id(&self) -> &str;

    /// Open a new conversation thread.
    async fn new_thread(&self) -> Result<AgentThread, AgentError>;

    /// Run a prompt to completion on an existing thread.
    async fn run(&self, prompt: &str, thread: &AgentThread) -> Result<AgentReply, AgentError>;
}

/// Explicit map from agent id to capability, handed to the engine per run.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<dyn AgentCapability>>,
    order: Vec<String>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own id. Re-registering an id replaces
    /// the previous capability but keeps its position.
    pub fn register(&mut self, agent: Arc<dyn AgentCapability>) {
        let id = agent.id().to_string();
        if self.agents.insert(id.clone(), agent).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn AgentCapability>> {
        self.agents.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.agents.contains_key(id)
    }

    /// Agent ids in registration order.
    pub fn agent_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Deterministic in-process agent used by the demo server and tests.
///
/// Replies with a fixed payload regardless of prompt, or fails every
/// invocation when built with [`ScriptedAgent::failing`].
pub struct ScriptedAgent {
    id: String,
    reply: String,
    fail: bool,
}

impl ScriptedAgent {
    pub fn new(id: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reply: reply.into(),
            fail: false,
        }
    }

    /// An agent whose every invocation fails.
    pub fn failing(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reply: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl AgentCapability for ScriptedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_thread(&self) -> Result<AgentThread, AgentError> {
        Ok(AgentThread::new())
    }

    async fn run(&self, _prompt: &str, _thread: &AgentThread) -> Result<AgentReply, AgentError> {
        if self.fail {
            return Err(AgentError::Invocation(format!(
                "scripted failure from '{}'",
                self.id
            )));
        }
        Ok(AgentReply {
            text: self.reply.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(ScriptedAgent::new("finder", "ok")));
        registry.register(Arc::new(ScriptedAgent::new("matcher", "ok")));
        registry.register(Arc::new(ScriptedAgent::new("navigator", "ok")));

        assert_eq!(registry.agent_ids(), ["finder", "matcher", "navigator"]);
        assert!(registry.contains("matcher"));
        assert!(!registry.contains("critic"));
    }

    #[test]
    fn re_registering_replaces_without_reordering() {
        let mut registry = AgentRegistry::new();
        registry.register(Arc::new(ScriptedAgent::new("finder", "v1")));
        registry.register(Arc::new(ScriptedAgent::new("matcher", "ok")));
        registry.register(Arc::new(ScriptedAgent::new("finder", "v2")));

        assert_eq!(registry.agent_ids(), ["finder", "matcher"]);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn scripted_agent_replies_and_fails_on_demand() {
        let agent = ScriptedAgent::new("finder", "found tents");
        let thread = agent.new_thread().await.unwrap();
        let reply = agent.run("find camping gear", &thread).await.unwrap();
        assert_eq!(reply.text, "found tents");

        let broken = ScriptedAgent::failing("finder");
        let thread = broken.new_thread().await.unwrap();
        assert!(broken.run("anything", &thread).await.is_err());
    }
}
