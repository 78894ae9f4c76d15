//! # Step Collector
//!
//! Reduces the execution event stream into the ordered step log. Pure
//! reduction: progress events only move the active-executor bookkeeping,
//! every message of every output event becomes exactly one step, and message
//! order within an event is preserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::events::ExecutionEvent;

/// One recorded output produced by one agent during a run.
/// Immutable once created; lifetime is a single orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentStep {
    pub agent_id: String,
    /// Human-readable label of what was attempted.
    pub action: String,
    /// Raw, possibly-JSON agent output.
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

/// Drain the event stream into an ordered step list.
pub async fn collect(rx: mpsc::Receiver<ExecutionEvent>, action: &str) -> Vec<AgentStep> {
    collect_tapped(rx, action, None).await
}

/// Like [`collect`], forwarding every event to `tap` for live observers.
/// A full or closed tap never stalls the reduction.
pub async fn collect_tapped(
    mut rx: mpsc::Receiver<ExecutionEvent>,
    action: &str,
    tap: Option<&mpsc::Sender<ExecutionEvent>>,
) -> Vec<AgentStep> {
    let mut steps = Vec::new();
    let mut active: Option<String> = None;

    while let Some(event) = rx.recv().await {
        if let Some(tap) = tap {
            let _ = tap.try_send(event.clone());
        }
        match event {
            ExecutionEvent::Progress { executor_id } => {
                // Consecutive duplicates are coalesced; only transitions count.
                if active.as_deref() != Some(executor_id.as_str()) {
                    tracing::debug!(executor = %executor_id, "active executor changed");
                    active = Some(executor_id);
                }
            }
            ExecutionEvent::Output { messages, .. } => {
                for message in messages {
                    steps.push(AgentStep {
                        agent_id: message.author,
                        action: action.to_string(),
                        result: message.text,
                        timestamp: message.created_at,
                    });
                }
            }
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::events::AgentMessage;

    async fn run_collect(events: Vec<ExecutionEvent>) -> Vec<AgentStep> {
        let (tx, rx) = mpsc::channel(16);
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        collect(rx, "Processed request").await
    }

    #[tokio::test]
    async fn progress_events_emit_no_steps() {
        let steps = run_collect(vec![
            ExecutionEvent::progress("finder"),
            ExecutionEvent::progress("finder"),
            ExecutionEvent::progress("matcher"),
        ])
        .await;
        assert!(steps.is_empty());
    }

    #[tokio::test]
    async fn every_message_becomes_one_step_in_order() {
        let steps = run_collect(vec![
            ExecutionEvent::progress("finder"),
            ExecutionEvent::output(
                "finder",
                vec![
                    AgentMessage::new("finder", "first"),
                    AgentMessage::new("finder", "second"),
                ],
            ),
            ExecutionEvent::single_output("matcher", "third"),
        ])
        .await;

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].result, "first");
        assert_eq!(steps[1].result, "second");
        assert_eq!(steps[2].agent_id, "matcher");
        assert_eq!(steps[0].action, "Processed request");
    }

    #[tokio::test]
    async fn step_timestamp_comes_from_the_message() {
        let message = AgentMessage::new("finder", "payload");
        let created_at = message.created_at;
        let steps = run_collect(vec![ExecutionEvent::output("finder", vec![message])]).await;
        assert_eq!(steps[0].timestamp, created_at);
    }

    #[tokio::test]
    async fn tap_receives_forwarded_events() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(ExecutionEvent::single_output("finder", "payload"))
            .await
            .unwrap();
        drop(tx);

        let (tap_tx, mut tap_rx) = mpsc::channel(16);
        let steps = collect_tapped(rx, "label", Some(&tap_tx)).await;
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            tap_rx.try_recv(),
            Ok(ExecutionEvent::Output { .. })
        ));
    }
}
