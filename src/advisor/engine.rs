//! ConversationEngine — drives one chat session through the scripted
//! onboarding and into open chat.
//!
//! The state mutex is only held for bookkeeping, never across the webhook
//! call. The `pending` flag is the gate that keeps one call in flight per
//! conversation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::model::Turn;
use super::responder::{Responder, ResponderRequest};
use super::state::{ConversationState, Phase};
use crate::error::ResponderError;

/// Why a submission was refused. Refused submissions change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Empty or whitespace-only text.
    Blank,
    /// A previous submission is still waiting on the webhook.
    Pending,
}

/// What an accepted submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    /// The advisor turn appended this round, if any.
    pub advisor_turn: Option<Turn>,
    /// Non-fatal notice when the webhook failed.
    pub notice: Option<String>,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    Accepted(SubmitReport),
}

pub struct ConversationEngine {
    product_id: String,
    visitor_id: Option<String>,
    responder: Arc<dyn Responder>,
    state: Mutex<ConversationState>,
}

impl ConversationEngine {
    pub fn new(product_id: impl Into<String>, responder: Arc<dyn Responder>) -> Self {
        Self {
            product_id: product_id.into(),
            visitor_id: None,
            responder,
            state: Mutex::new(ConversationState::default()),
        }
    }

    /// Forward a visitor identifier with every webhook call.
    pub fn with_visitor_id(mut self, visitor_id: impl Into<String>) -> Self {
        self.visitor_id = Some(visitor_id.into());
        self
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Whether a submission is waiting on the responder.
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ConversationState {
        self.lock().clone()
    }

    /// Take one visitor turn.
    ///
    /// During onboarding the answer fills the field for the current step and
    /// the conversation moves forward whether or not the webhook answers.
    /// Once open, turns are only forwarded. The pending gate is released on
    /// every path, including when this future is dropped mid-call.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let request = {
            let mut state = self.lock();
            if text.trim().is_empty() {
                return SubmitOutcome::Rejected(Rejection::Blank);
            }
            if state.pending {
                return SubmitOutcome::Rejected(Rejection::Pending);
            }

            state.pending = true;
            state.push(Turn::visitor(text));
            if let Phase::Onboarding { step } = state.phase {
                state.fields.record(step, text);
            }

            ResponderRequest {
                message: text.to_string(),
                product_id: self.product_id.clone(),
                step: state.step(),
                customer_info: state.fields.clone(),
                user_id: self.visitor_id.clone(),
            }
        };

        let gate = PendingGate { engine: self };
        debug!(product_id = %self.product_id, step = request.step, "Forwarding visitor turn");
        let result = self.responder.respond(&request).await;

        let report = {
            let mut state = self.lock();
            apply_response(&mut state, result, &self.product_id)
        };
        drop(gate);

        SubmitOutcome::Accepted(report)
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears `pending` when dropped.
struct PendingGate<'a> {
    engine: &'a ConversationEngine,
}

impl Drop for PendingGate<'_> {
    fn drop(&mut self) {
        self.engine.lock().pending = false;
    }
}

fn apply_response(
    state: &mut ConversationState,
    result: Result<Option<String>, ResponderError>,
    product_id: &str,
) -> SubmitReport {
    let (advisor_turn, notice) = match (state.phase, result) {
        (Phase::Onboarding { .. }, Ok(Some(reply))) => {
            let turn = state.push(Turn::advisor(reply));
            state.phase = state.phase.advanced();
            (Some(turn), None)
        }
        (Phase::Onboarding { .. }, Ok(None)) => (state.fall_back_to_script(), None),
        (Phase::Onboarding { step }, Err(e)) => {
            warn!(product_id = %product_id, step, error = %e, "Advisor webhook failed, using scripted prompt");
            (state.fall_back_to_script(), Some(e.to_string()))
        }
        (Phase::Open { .. }, Ok(Some(reply))) => (Some(state.push(Turn::advisor(reply))), None),
        (Phase::Open { .. }, Ok(None)) => (None, None),
        (Phase::Open { .. }, Err(e)) => {
            warn!(product_id = %product_id, error = %e, "Advisor webhook failed in open chat");
            (None, Some(e.to_string()))
        }
    };

    SubmitReport {
        advisor_turn,
        notice,
        phase: state.phase,
    }
}
