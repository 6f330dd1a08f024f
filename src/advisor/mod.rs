//! Product advisor chat.
//!
//! Each chat widget owns a conversation that first walks three scripted
//! questions (name, location, question about the product) and then turns
//! into open chat. Every visitor turn is forwarded to an external responder;
//! when it fails or has nothing to say, the scripted prompts keep the
//! conversation moving.

pub mod engine;
pub mod model;
pub mod prompts;
pub mod responder;
pub mod routes;
pub mod sessions;
pub mod state;

pub use engine::{ConversationEngine, Rejection, SubmitOutcome, SubmitReport};
pub use model::{CollectedFields, Speaker, Turn};
pub use responder::{Responder, ResponderRequest, SilentResponder, WebhookResponder};
pub use routes::{ChatRouteState, chat_routes};
pub use sessions::{ChatSessions, spawn_expiry_task};
pub use state::{ConversationState, Phase};
