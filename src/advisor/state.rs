//! Conversation state machine: onboarding steps, then open chat.

use serde::{Deserialize, Serialize};

use super::model::{CollectedFields, Turn};
use super::prompts::{self, SCRIPTED_STEPS};

/// Where the conversation is.
///
/// `Onboarding` walks the scripted questions; `Open` is free-form chat and
/// is never left. `Open` keeps the step at which onboarding ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    Onboarding { step: usize },
    Open { step: usize },
}

impl Phase {
    pub fn step(&self) -> usize {
        match self {
            Self::Onboarding { step } | Self::Open { step } => *step,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Move one step forward, opening the conversation once the script is
    /// exhausted. `Open` stays as it is.
    pub fn advanced(self) -> Phase {
        match self {
            Self::Onboarding { step } if step + 1 >= SCRIPTED_STEPS => Self::Open { step: step + 1 },
            Self::Onboarding { step } => Self::Onboarding { step: step + 1 },
            open @ Self::Open { .. } => open,
        }
    }

    /// Open the conversation without moving the step.
    pub fn opened(self) -> Phase {
        Self::Open { step: self.step() }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Onboarding { step: 0 }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onboarding { step } => write!(f, "onboarding (step {step})"),
            Self::Open { .. } => write!(f, "open"),
        }
    }
}

/// Everything a chat session knows. Lives only as long as the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub transcript: Vec<Turn>,
    pub phase: Phase,
    pub fields: CollectedFields,
    /// True while a webhook call is in flight; new submissions are refused.
    pub pending: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            transcript: vec![Turn::advisor(prompts::opening_prompt())],
            phase: Phase::default(),
            fields: CollectedFields::default(),
            pending: false,
        }
    }
}

impl ConversationState {
    pub fn step(&self) -> usize {
        self.phase.step()
    }

    /// Append a turn and hand back a copy of it.
    pub(crate) fn push(&mut self, turn: Turn) -> Turn {
        self.transcript.push(turn.clone());
        turn
    }

    /// Onboarding fallback when the webhook gave nothing usable: ask the
    /// next scripted question, or open the conversation if there is none.
    pub(crate) fn fall_back_to_script(&mut self) -> Option<Turn> {
        match prompts::next_prompt(self.step()) {
            Some(prompt) => {
                self.phase = self.phase.advanced();
                Some(self.push(Turn::advisor(prompt)))
            }
            None => {
                self.phase = self.phase.opened();
                None
            }
        }
    }
}
