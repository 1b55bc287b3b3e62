//! Per-user conversation windows

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use billing_core::ConversationMemory;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub type SessionHandle = Arc<AsyncMutex<ConversationMemory>>;

/// Conversation memory keyed by user id.
///
/// Get-or-create happens under the map lock, so two first requests from the
/// same user always share one window. Holding the per-user guard for a whole
/// request serializes that user's requests.
pub struct SessionStore {
    window: usize,
    sessions: Mutex<HashMap<i64, SessionHandle>>,
}

impl SessionStore {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn handle(&self, user_id: i64) -> SessionHandle {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions
            .entry(user_id)
            .or_insert_with(|| {
                tracing::debug!(user_id, window = self.window, "New conversation window");
                Arc::new(AsyncMutex::new(ConversationMemory::new(self.window)))
            })
            .clone()
    }

    /// Exclusive access to the user's window, created on first contact
    pub async fn acquire(&self, user_id: i64) -> OwnedMutexGuard<ConversationMemory> {
        self.handle(user_id).lock_owned().await
    }

    /// Snapshot of a known user's window, `None` for users never seen
    pub async fn snapshot(&self, user_id: i64) -> Option<ConversationMemory> {
        let handle = {
            let sessions = self
                .sessions
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sessions.get(&user_id).cloned()
        }?;
        let memory = handle.lock().await;
        Some(memory.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_contact_creates_one_window() {
        let store = Arc::new(SessionStore::new(3));
        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let mut memory = store.acquire(7).await;
                memory.record(format!("q{i}"), "a");
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.len(), 1);
        let memory = store.snapshot(7).await.unwrap();
        assert_eq!(memory.len(), 3);
    }

    #[tokio::test]
    async fn unknown_user_has_no_snapshot() {
        let store = SessionStore::new(3);
        assert!(store.snapshot(1).await.is_none());
        assert!(store.is_empty());
    }
}
