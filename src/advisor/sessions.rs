//! Live chat sessions, one engine per open widget.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::engine::ConversationEngine;
use super::responder::Responder;

/// How often the expiry task sweeps idle sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct SessionEntry {
    engine: Arc<ConversationEngine>,
    last_active: Mutex<DateTime<Utc>>,
}

impl SessionEntry {
    fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    fn last_active(&self) -> DateTime<Utc> {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of open conversations. Nothing here is persisted: closing a
/// session forgets its transcript and collected fields. Sessions the widget
/// never closes are reaped once idle (see [`ChatSessions::expire_idle`]).
pub struct ChatSessions {
    responder: Arc<dyn Responder>,
    visitor_id: Option<String>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl ChatSessions {
    pub fn new(responder: Arc<dyn Responder>, visitor_id: Option<String>) -> Self {
        Self {
            responder,
            visitor_id,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a fresh conversation about a product.
    pub async fn open(&self, product_id: &str) -> (Uuid, Arc<ConversationEngine>) {
        let mut engine = ConversationEngine::new(product_id, Arc::clone(&self.responder));
        if let Some(ref visitor_id) = self.visitor_id {
            engine = engine.with_visitor_id(visitor_id.clone());
        }
        let engine = Arc::new(engine);
        let id = Uuid::new_v4();

        let entry = SessionEntry {
            engine: Arc::clone(&engine),
            last_active: Mutex::new(Utc::now()),
        };
        self.sessions.write().await.insert(id, entry);
        info!(session_id = %id, product_id = %product_id, "Chat session opened");
        (id, engine)
    }

    /// Look up a session. Counts as activity.
    pub async fn get(&self, id: Uuid) -> Option<Arc<ConversationEngine>> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id)?;
        entry.touch();
        Some(Arc::clone(&entry.engine))
    }

    /// Discard a conversation. Returns whether it existed.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Chat session closed");
        }
        removed
    }

    /// Drop sessions idle for longer than `idle_ttl`. A session waiting on
    /// the responder is kept. Returns the number of sessions dropped.
    pub async fn expire_idle(&self, idle_ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(idle_ttl) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };
        self.expire_idle_before(cutoff).await
    }

    async fn expire_idle_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            let keep = entry.engine.is_pending() || entry.last_active() >= cutoff;
            if !keep {
                debug!(session_id = %id, "Chat session expired");
            }
            keep
        });

        let expired = before - sessions.len();
        if expired > 0 {
            info!(
                count = expired,
                remaining = sessions.len(),
                "Expired idle chat sessions"
            );
        }
        expired
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn a background task that periodically drops idle chat sessions.
pub fn spawn_expiry_task(
    sessions: Arc<ChatSessions>,
    idle_ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sessions.expire_idle(idle_ttl).await;
        }
    })
}
