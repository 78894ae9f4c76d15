//! # Execution Events
//!
//! Events streamed while a topology runs. Only two kinds matter to the
//! engine: progress transitions and finalized agent output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finalized message produced by an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentMessage {
    /// Agent that authored the message.
    pub author: String,
    /// Raw, possibly-JSON message body.
    pub text: String,
    /// When the message was finalized.
    pub created_at: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Event emitted by the topology executor.
///
/// The stream ends naturally when the topology has no more work; there is no
/// explicit done event distinct from channel closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// An agent became the active executor.
    Progress { executor_id: String },
    /// An agent produced one or more finalized messages.
    Output {
        source_id: String,
        messages: Vec<AgentMessage>,
    },
}

impl ExecutionEvent {
    pub fn progress(executor_id: impl Into<String>) -> Self {
        Self::Progress {
            executor_id: executor_id.into(),
        }
    }

    pub fn output(source_id: impl Into<String>, messages: Vec<AgentMessage>) -> Self {
        Self::Output {
            source_id: source_id.into(),
            messages,
        }
    }

    /// Output event carrying a single message authored by the source agent.
    pub fn single_output(source_id: &str, text: impl Into<String>) -> Self {
        Self::output(source_id, vec![AgentMessage::new(source_id, text)])
    }
}
