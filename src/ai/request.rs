//! Lifecycle of the single outstanding AI request behind the modal.
//!
//! `Idle -> Pending -> Succeeded | Failed`, with `close` returning to `Idle`
//! from any state. Every submission gets a fresh ticket and completions are
//! only applied when their ticket is the one currently pending, so a response
//! that arrives after the modal was closed (or after a newer submission) is
//! dropped.

use super::{AiResult, AiTool};

pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum AiRequest {
    Idle,
    Pending { ticket: Ticket, tool: AiTool },
    Succeeded(AiResult),
    Failed(String),
}

#[derive(Debug)]
pub struct AiSession {
    state: AiRequest,
    next_ticket: Ticket,
}

impl Default for AiSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AiSession {
    pub fn new() -> Self {
        Self {
            state: AiRequest::Idle,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &AiRequest {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, AiRequest::Pending { .. })
    }

    /// Start a request. Refused while another one is pending. Any previous
    /// result or error is discarded.
    pub fn submit(&mut self, tool: AiTool) -> Option<Ticket> {
        if self.is_pending() {
            return None;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.state = AiRequest::Pending { ticket, tool };
        Some(ticket)
    }

    /// Apply the outcome of request `ticket`. Returns false when the outcome
    /// was stale and ignored.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<AiResult, String>) -> bool {
        match self.state {
            AiRequest::Pending { ticket: current, .. } if current == ticket => {
                self.state = match outcome {
                    Ok(result) => AiRequest::Succeeded(result),
                    Err(message) => AiRequest::Failed(message),
                };
                true
            }
            _ => {
                tracing::debug!(ticket, "discarding stale AI response");
                false
            }
        }
    }

    /// Back to idle. A pending request is abandoned, not cancelled upstream.
    pub fn close(&mut self) {
        if let AiRequest::Pending { ticket, .. } = self.state {
            tracing::info!(ticket, "AI modal closed while request pending");
        }
        self.state = AiRequest::Idle;
    }
}
