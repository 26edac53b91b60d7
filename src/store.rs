use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::Conversation;

/// In-memory map of active calls, keyed by the provider call id.
///
/// Each call id maps to exactly one record for the duration of the call, so
/// concurrent calls never see each other's state. Callers get snapshot clones;
/// the lock is never held across outbound I/O.
pub struct ConversationStore {
    calls: Mutex<HashMap<String, Conversation>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Get-or-create the record for a call. Idempotent per call id.
    pub async fn ensure(&self, call_sid: &str, caller_id: &str) {
        let mut calls = self.calls.lock().await;
        calls
            .entry(call_sid.to_string())
            .or_insert_with(|| Conversation::new(caller_id));
    }

    /// Record a caller utterance and return a snapshot of the updated record.
    pub async fn record_question(
        &self,
        call_sid: &str,
        caller_id: &str,
        question: &str,
    ) -> Conversation {
        let mut calls = self.calls.lock().await;
        let conversation = calls
            .entry(call_sid.to_string())
            .or_insert_with(|| Conversation::new(caller_id));
        conversation.record_question(question);
        conversation.clone()
    }

    /// Record the assistant's reply for a call, if the record still exists.
    pub async fn record_reply(&self, call_sid: &str, reply: &str) {
        let mut calls = self.calls.lock().await;
        if let Some(conversation) = calls.get_mut(call_sid) {
            conversation.record_reply(reply);
        }
    }

    pub async fn snapshot(&self, call_sid: &str) -> Option<Conversation> {
        self.calls.lock().await.get(call_sid).cloned()
    }

    /// Evict a finished call and hand back its final record.
    pub async fn remove(&self, call_sid: &str) -> Option<Conversation> {
        self.calls.lock().await.remove(call_sid)
    }

    pub async fn active_calls(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Drop records with no activity for longer than `max_idle`. Bounds memory
    /// for calls that were abandoned without reaching a terminal webhook.
    pub async fn sweep_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut calls = self.calls.lock().await;
        let before = calls.len();
        calls.retain(|_, conversation| conversation.last_activity > cutoff);
        before - calls.len()
    }

    /// Spawn a background task that periodically evicts idle call records.
    pub fn start_idle_sweeper(store: Arc<Self>, every: Duration, max_idle: chrono::Duration) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                let evicted = store.sweep_idle(max_idle).await;
                if evicted > 0 {
                    info!("Evicted {} idle call record(s)", evicted);
                } else {
                    debug!("Idle sweep found nothing to evict");
                }
            }
        });
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
