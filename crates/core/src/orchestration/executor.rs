//! # Topology Executor
//!
//! Runs a built topology against an initial input, streaming execution
//! events over a channel. The caller drains the receiver until it closes;
//! stream closure is the only completion signal.
//!
//! Agent failures are absorbed here: a failed invocation is logged and
//! produces no output event, and the run continues. Only the synthesizers
//! decide what a missing output means.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use crate::agents::{AgentCapability, AgentRegistry};

use super::events::{AgentMessage, ExecutionEvent};
use super::topology::Topology;

/// Event channel buffer; the collector drains continuously so a run rarely
/// has this many events in flight.
const EVENT_BUFFER: usize = 64;

/// Bounds a handoff walk even if build-time cycle validation is relaxed.
pub const DEFAULT_HANDOFF_STEP_BUDGET: usize = 16;

/// A running topology: the event stream plus the driver task.
pub struct ExecutionHandle {
    pub events: mpsc::Receiver<ExecutionEvent>,
    pub task: JoinHandle<()>,
}

/// Start executing `topology` against `initial_input`.
pub fn execute(topology: Topology, registry: AgentRegistry, initial_input: String) -> ExecutionHandle {
    execute_with_budget(topology, registry, initial_input, DEFAULT_HANDOFF_STEP_BUDGET)
}

/// [`execute`] with an explicit handoff step budget.
pub fn execute_with_budget(
    topology: Topology,
    registry: AgentRegistry,
    initial_input: String,
    handoff_step_budget: usize,
) -> ExecutionHandle {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let task = tokio::spawn(async move {
        match topology {
            Topology::Sequential { agents } => {
                run_sequential(&agents, &registry, initial_input, &tx).await;
            }
            Topology::Concurrent { agents } => {
                run_concurrent(&agents, &registry, initial_input, &tx).await;
            }
            Topology::Handoff { entry, edges } => {
                run_handoff(entry, &edges, &registry, initial_input, handoff_step_budget, &tx)
                    .await;
            }
            Topology::GroupChat {
                participants,
                max_turns,
            } => {
                run_group_chat(&participants, max_turns, &registry, initial_input, &tx).await;
            }
        }
    });
    ExecutionHandle { events: rx, task }
}

/// Run one agent on a fresh thread. Returns `None` on any failure; the
/// failure is logged and the run continues without this agent's output.
async fn invoke(agent: &dyn AgentCapability, prompt: &str) -> Option<String> {
    let thread = match agent.new_thread().await {
        Ok(thread) => thread,
        Err(error) => {
            tracing::warn!(agent = agent.id(), %error, "could not open agent thread");
            return None;
        }
    };
    match agent.run(prompt, &thread).await {
        Ok(reply) => Some(reply.text),
        Err(error) => {
            tracing::warn!(agent = agent.id(), %error, "agent invocation failed");
            None
        }
    }
}

fn resolve(registry: &AgentRegistry, id: &str) -> Option<Arc<dyn AgentCapability>> {
    let agent = registry.get(id);
    if agent.is_none() {
        tracing::warn!(agent = %id, "agent missing from registry, skipping");
    }
    agent
}

/// Chain: agent *i*'s output joins the context seen by agent *i+1*.
async fn run_sequential(
    agents: &[String],
    registry: &AgentRegistry,
    initial_input: String,
    tx: &mpsc::Sender<ExecutionEvent>,
) {
    let mut context = initial_input;
    for id in agents {
        let Some(agent) = resolve(registry, id) else {
            continue;
        };
        let _ = tx.send(ExecutionEvent::progress(id)).await;
        if let Some(reply) = invoke(agent.as_ref(), &context).await {
            context = format!("{context}\n\n[{id}]\n{reply}");
            let _ = tx.send(ExecutionEvent::single_output(id, reply)).await;
        }
    }
}

/// Star: every agent gets the initial input; events arrive in completion
/// order, not declaration order.
async fn run_concurrent(
    agents: &[String],
    registry: &AgentRegistry,
    initial_input: String,
    tx: &mpsc::Sender<ExecutionEvent>,
) {
    let mut branches = JoinSet::new();
    for id in agents {
        let Some(agent) = resolve(registry, id) else {
            continue;
        };
        let tx = tx.clone();
        let input = initial_input.clone();
        branches.spawn(async move {
            let _ = tx.send(ExecutionEvent::progress(agent.id())).await;
            if let Some(reply) = invoke(agent.as_ref(), &input).await {
                let _ = tx
                    .send(ExecutionEvent::single_output(agent.id(), reply))
                    .await;
            }
        });
    }
    while let Some(result) = branches.join_next().await {
        if let Err(error) = result {
            tracing::warn!(%error, "concurrent branch panicked");
        }
    }
}

/// Walk the declared edges from the entry agent. A fresh thread is opened
/// per transition (inside [`invoke`]); the step budget bounds the walk.
async fn run_handoff(
    entry: String,
    edges: &[(String, String)],
    registry: &AgentRegistry,
    initial_input: String,
    step_budget: usize,
    tx: &mpsc::Sender<ExecutionEvent>,
) {
    let mut context = initial_input;
    let mut current = Some(entry);
    let mut hops = 0usize;

    while let Some(id) = current {
        if hops >= step_budget {
            tracing::warn!(budget = step_budget, "handoff step budget exhausted");
            break;
        }
        hops += 1;

        if let Some(agent) = resolve(registry, &id) {
            let _ = tx.send(ExecutionEvent::progress(&id)).await;
            if let Some(reply) = invoke(agent.as_ref(), &context).await {
                context = format!("{context}\n\n[{id}]\n{reply}");
                let _ = tx.send(ExecutionEvent::single_output(&id, reply)).await;
            }
        }

        // Transition fires once the current agent completes; an agent with
        // no outgoing edge is terminal.
        current = edges
            .iter()
            .find(|(from, _)| *from == id)
            .map(|(_, to)| to.clone());
    }
}

/// Round-robin turns over the participants, each seeing the running
/// transcript, until the turn cap is reached.
async fn run_group_chat(
    participants: &[String],
    max_turns: usize,
    registry: &AgentRegistry,
    initial_input: String,
    tx: &mpsc::Sender<ExecutionEvent>,
) {
    let mut transcript = initial_input;
    let mut turns = 0usize;

    'chat: loop {
        for id in participants {
            if turns >= max_turns {
                break 'chat;
            }
            turns += 1;

            let Some(agent) = resolve(registry, id) else {
                continue;
            };
            let _ = tx.send(ExecutionEvent::progress(id)).await;
            if let Some(reply) = invoke(agent.as_ref(), &transcript).await {
                transcript = format!("{transcript}\n\n{id}: {reply}");
                let _ = tx.send(ExecutionEvent::single_output(id, reply)).await;
            }
        }
        if participants.is_empty() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ScriptedAgent;
    use crate::orchestration::collector;
    use crate::orchestration::topology::{OrchestrationKind, Topology, TopologyOptions};

    fn registry(ids: &[&str]) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        for id in ids {
            registry.register(Arc::new(ScriptedAgent::new(*id, format!("reply from {id}"))));
        }
        registry
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    async fn run_to_steps(topology: Topology, registry: AgentRegistry) -> Vec<collector::AgentStep> {
        let handle = execute(topology, registry, "go".to_string());
        let steps = collector::collect(handle.events, "test").await;
        handle.task.await.unwrap();
        steps
    }

    #[tokio::test]
    async fn sequential_emits_steps_in_declared_order() {
        let topology = Topology::Sequential {
            agents: ids(&["a", "b", "c", "d"]),
        };
        let steps = run_to_steps(topology, registry(&["a", "b", "c", "d"])).await;
        let order: Vec<&str> = steps.iter().map(|s| s.agent_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn sequential_records_raw_agent_output() {
        let topology = Topology::Sequential {
            agents: ids(&["a", "b"]),
        };
        let steps = run_to_steps(topology, registry(&["a", "b"])).await;
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].result, "reply from a");
        assert_eq!(steps[1].result, "reply from b");
    }

    /// Replies with the prompt it received, so tests can observe context flow.
    struct PromptEcho {
        id: String,
    }

    #[async_trait::async_trait]
    impl AgentCapability for PromptEcho {
        fn id(&self) -> &str {
            &self.id
        }

        async fn new_thread(&self) -> Result<crate::agents::AgentThread, crate::error::AgentError> {
            Ok(crate::agents::AgentThread::new())
        }

        async fn run(
            &self,
            prompt: &str,
            _thread: &crate::agents::AgentThread,
        ) -> Result<crate::agents::AgentReply, crate::error::AgentError> {
            Ok(crate::agents::AgentReply {
                text: prompt.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn sequential_feeds_earlier_output_into_later_context() {
        let mut registry = registry(&["a"]);
        registry.register(Arc::new(PromptEcho {
            id: "echo".to_string(),
        }));
        let topology = Topology::Sequential {
            agents: ids(&["a", "echo"]),
        };
        let steps = run_to_steps(topology, registry).await;
        assert_eq!(steps.len(), 2);
        // The echo agent's prompt contained both the initial input and a's output.
        assert!(steps[1].result.contains("go"));
        assert!(steps[1].result.contains("reply from a"));
    }

    #[tokio::test]
    async fn concurrent_branches_only_see_the_initial_input() {
        let mut registry = registry(&["a"]);
        registry.register(Arc::new(PromptEcho {
            id: "echo".to_string(),
        }));
        let topology = Topology::Concurrent {
            agents: ids(&["a", "echo"]),
        };
        let steps = run_to_steps(topology, registry).await;
        let echo_step = steps.iter().find(|s| s.agent_id == "echo").unwrap();
        assert_eq!(echo_step.result, "go");
    }

    #[tokio::test]
    async fn concurrent_covers_every_agent() {
        let topology = Topology::Concurrent {
            agents: ids(&["a", "b", "c"]),
        };
        let steps = run_to_steps(topology, registry(&["a", "b", "c"])).await;
        let mut seen: Vec<&str> = steps.iter().map(|s| s.agent_id.as_str()).collect();
        seen.sort_unstable();
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn handoff_follows_declared_edges() {
        let topology = Topology::build(
            OrchestrationKind::Handoff,
            &ids(&["a", "b", "c", "d"]),
            &TopologyOptions::default(),
        )
        .unwrap();
        let steps = run_to_steps(topology, registry(&["a", "b", "c", "d"])).await;
        let order: Vec<&str> = steps.iter().map(|s| s.agent_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn handoff_step_budget_bounds_the_walk() {
        // Chain of two with a budget of one: only the entry agent runs.
        let topology = Topology::Handoff {
            entry: "a".to_string(),
            edges: vec![("a".to_string(), "b".to_string())],
        };
        let handle = execute_with_budget(topology, registry(&["a", "b"]), "go".to_string(), 1);
        let steps = collector::collect(handle.events, "test").await;
        handle.task.await.unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].agent_id, "a");
    }

    #[tokio::test]
    async fn group_chat_respects_turn_cap() {
        let topology = Topology::GroupChat {
            participants: ids(&["a", "b"]),
            max_turns: 5,
        };
        let steps = run_to_steps(topology, registry(&["a", "b"])).await;
        assert_eq!(steps.len(), 5);
        let order: Vec<&str> = steps.iter().map(|s| s.agent_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "a", "b", "a"]);
    }

    #[tokio::test]
    async fn failing_agent_is_absorbed_not_fatal() {
        let mut registry = registry(&["a", "c"]);
        registry.register(Arc::new(ScriptedAgent::failing("b")));
        let topology = Topology::Sequential {
            agents: ids(&["a", "b", "c"]),
        };
        let steps = run_to_steps(topology, registry).await;
        let order: Vec<&str> = steps.iter().map(|s| s.agent_id.as_str()).collect();
        assert_eq!(order, ["a", "c"]);
    }

    #[tokio::test]
    async fn unregistered_agent_is_skipped() {
        let topology = Topology::Sequential {
            agents: ids(&["a", "ghost", "b"]),
        };
        let steps = run_to_steps(topology, registry(&["a", "b"])).await;
        let order: Vec<&str> = steps.iter().map(|s| s.agent_id.as_str()).collect();
        assert_eq!(order, ["a", "b"]);
    }
}
