//! Transcript and collected-field models for the advisor chat.

use serde::{Deserialize, Serialize};

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Advisor,
    Visitor,
}

/// One message in the transcript. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn advisor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Advisor,
            text: text.into(),
        }
    }

    pub fn visitor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Visitor,
            text: text.into(),
        }
    }
}

/// What the onboarding questions collected about the visitor.
///
/// Sent to the advisor webhook as `customerInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedFields {
    pub name: Option<String>,
    pub location: Option<String>,
    pub question: Option<String>,
}

impl CollectedFields {
    /// Record the visitor's answer to the onboarding question at `step`.
    ///
    /// Step 0 is the name, 1 the location, 2 the question; later steps have
    /// no slot. A slot that is already filled is left alone. Returns whether
    /// the answer was stored.
    pub fn record(&mut self, step: usize, answer: &str) -> bool {
        let slot = match step {
            0 => &mut self.name,
            1 => &mut self.location,
            2 => &mut self.question,
            _ => return false,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(answer.to_string());
        true
    }
}
