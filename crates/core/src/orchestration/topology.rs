//! # Topology Builder
//!
//! Turns an orchestration kind plus an ordered agent list into an executable
//! topology value. Each variant is a self-contained strategy; the executor
//! dispatches on the variant instead of branching at call sites.
//!
//! ## Shapes
//!
//! ```text
//! Sequential: A → B → C → D          (path)
//! Concurrent: input → {A, B, C, D}   (star)
//! Handoff:    declared edges A → B → C → D
//! GroupChat:  round-robin over {A, B, C, D}, capped turns
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Turn cap that guarantees a group chat terminates.
pub const DEFAULT_GROUP_CHAT_TURNS: usize = 5;

/// Selects the execution topology shape.
///
/// `Magentic` is a reserved variant with no builder support; requesting it
/// yields [`EngineError::UnsupportedOrchestration`] before execution starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrchestrationKind {
    Sequential,
    Concurrent,
    Handoff,
    GroupChat,
    Magentic,
}

impl OrchestrationKind {
    /// Human-readable description for the aggregated response.
    /// Static template, no agent involvement.
    pub fn describe(&self) -> &'static str {
        match self {
            OrchestrationKind::Sequential => {
                "Agents ran one after another; each agent's output fed the next agent's context."
            }
            OrchestrationKind::Concurrent => {
                "All agents received the same request and worked independently in parallel."
            }
            OrchestrationKind::Handoff => {
                "Control passed along explicit handoff edges, starting at the entry agent."
            }
            OrchestrationKind::GroupChat => {
                "Participants took turns in round-robin order until the turn cap was reached."
            }
            OrchestrationKind::Magentic => "Magentic orchestration is reserved and not implemented.",
        }
    }
}

impl fmt::Display for OrchestrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrchestrationKind::Sequential => "sequential",
            OrchestrationKind::Concurrent => "concurrent",
            OrchestrationKind::Handoff => "handoff",
            OrchestrationKind::GroupChat => "groupchat",
            OrchestrationKind::Magentic => "magentic",
        };
        f.write_str(name)
    }
}

/// Caller-supplied knobs for the builder.
#[derive(Debug, Clone, Default)]
pub struct TopologyOptions {
    /// Directed handoff edges. Empty means chain the agents in declared order.
    pub handoff_edges: Vec<(String, String)>,
    /// Turn cap for group chat; defaults to [`DEFAULT_GROUP_CHAT_TURNS`].
    pub max_turns: Option<usize>,
}

/// The concrete execution graph for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    /// Path graph in exactly the declared order.
    Sequential { agents: Vec<String> },
    /// Star graph: one source fanning out to independent sinks.
    Concurrent { agents: Vec<String> },
    /// Explicit directed edges walked from the entry agent.
    Handoff {
        entry: String,
        edges: Vec<(String, String)>,
    },
    /// Fixed participant set under a round-robin turn policy.
    GroupChat {
        participants: Vec<String>,
        max_turns: usize,
    },
}

impl Topology {
    /// Build an executable topology for `kind` over the declared agents.
    ///
    /// Handoff edge lists are validated here: edges must reference declared
    /// agents and must not form a cycle, since an unbounded cyclic walk could
    /// hang a run.
    pub fn build(
        kind: OrchestrationKind,
        agents: &[String],
        options: &TopologyOptions,
    ) -> Result<Self, EngineError> {
        if kind == OrchestrationKind::Magentic {
            return Err(EngineError::UnsupportedOrchestration(kind));
        }
        if agents.is_empty() {
            return Err(EngineError::EmptyTopology);
        }

        match kind {
            OrchestrationKind::Sequential => Ok(Topology::Sequential {
                agents: agents.to_vec(),
            }),
            OrchestrationKind::Concurrent => Ok(Topology::Concurrent {
                agents: agents.to_vec(),
            }),
            OrchestrationKind::Handoff => {
                let edges = if options.handoff_edges.is_empty() {
                    chain_edges(agents)
                } else {
                    options.handoff_edges.clone()
                };

                let declared: HashSet<&str> = agents.iter().map(String::as_str).collect();
                for (from, to) in &edges {
                    for endpoint in [from, to] {
                        if !declared.contains(endpoint.as_str()) {
                            return Err(EngineError::UnknownAgent(endpoint.clone()));
                        }
                    }
                }
                if has_cycle(&edges) {
                    return Err(EngineError::CyclicHandoff);
                }

                Ok(Topology::Handoff {
                    entry: agents[0].clone(),
                    edges,
                })
            }
            OrchestrationKind::GroupChat => Ok(Topology::GroupChat {
                participants: agents.to_vec(),
                max_turns: options.max_turns.unwrap_or(DEFAULT_GROUP_CHAT_TURNS),
            }),
            OrchestrationKind::Magentic => Err(EngineError::UnsupportedOrchestration(kind)),
        }
    }

    pub fn kind(&self) -> OrchestrationKind {
        match self {
            Topology::Sequential { .. } => OrchestrationKind::Sequential,
            Topology::Concurrent { .. } => OrchestrationKind::Concurrent,
            Topology::Handoff { .. } => OrchestrationKind::Handoff,
            Topology::GroupChat { .. } => OrchestrationKind::GroupChat,
        }
    }

    /// Mermaid flowchart of the topology. Diagnostic artifact only; nothing
    /// downstream computes over it.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("flowchart LR\n");
        match self {
            Topology::Sequential { agents } => {
                if agents.len() == 1 {
                    out.push_str(&format!("    {}\n", agents[0]));
                }
                for pair in agents.windows(2) {
                    out.push_str(&format!("    {} --> {}\n", pair[0], pair[1]));
                }
            }
            Topology::Concurrent { agents } => {
                out.push_str("    input((input))\n");
                for agent in agents {
                    out.push_str(&format!("    input --> {agent}\n"));
                }
            }
            Topology::Handoff { entry, edges } => {
                out.push_str(&format!("    start((start)) --> {entry}\n"));
                for (from, to) in edges {
                    out.push_str(&format!("    {from} --> {to}\n"));
                }
            }
            Topology::GroupChat {
                participants,
                max_turns,
            } => {
                out.push_str(&format!("    chat{{{{group chat, max {max_turns} turns}}}}\n"));
                for participant in participants {
                    out.push_str(&format!("    chat --- {participant}\n"));
                }
            }
        }
        out
    }
}

/// Chain the declared agents into a simple path: A→B→C→D.
fn chain_edges(agents: &[String]) -> Vec<(String, String)> {
    agents
        .windows(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Detect a cycle in the directed edge list via iterative DFS.
fn has_cycle(edges: &[(String, String)]) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for (from, to) in edges {
        adjacency.entry(from).or_default().push(to);
    }

    let roots: Vec<&str> = adjacency.keys().copied().collect();
    let mut done: HashSet<&str> = HashSet::new();
    for start in roots {
        if done.contains(start) {
            continue;
        }
        // (node, next child index) stack with an explicit in-progress set.
        let mut in_progress: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        in_progress.insert(start);

        while let Some((node, child)) = stack.pop() {
            let children = adjacency.get(node).map(|c| c.as_slice()).unwrap_or(&[]);
            if child < children.len() {
                stack.push((node, child + 1));
                let next = children[child];
                if in_progress.contains(next) {
                    return true;
                }
                if !done.contains(next) {
                    in_progress.insert(next);
                    stack.push((next, 0));
                }
            } else {
                in_progress.remove(node);
                done.insert(node);
            }
        }
    }
    false
}
