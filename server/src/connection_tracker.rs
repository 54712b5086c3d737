use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{watch, Mutex};

use common::SessionId;

/// Live WebSocket sessions plus the shutdown signal they all listen to.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    sessions: Arc<Mutex<HashSet<SessionId>>>,
    next_id: Arc<AtomicU64>,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashSet::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            shutdown_tx: Arc::new(watch::channel(false).0),
        }
    }

    pub async fn open_session(&self) -> SessionId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = SessionId::new(format!("session-{}", n));
        self.sessions.lock().await.insert(id.clone());
        id
    }

    pub async fn close_session(&self, id: &SessionId) -> bool {
        self.sessions.lock().await.remove(id)
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    pub fn notify_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let tracker = ConnectionTracker::new();
        let a = tracker.open_session().await;
        let b = tracker.clone().open_session().await;

        assert_ne!(a, b);
        assert_eq!(tracker.active_sessions().await, 2);
    }

    #[tokio::test]
    async fn test_close_session() {
        let tracker = ConnectionTracker::new();
        let id = tracker.open_session().await;

        assert!(tracker.close_session(&id).await);
        assert!(!tracker.close_session(&id).await);
        assert_eq!(tracker.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_reaches_subscribers() {
        let tracker = ConnectionTracker::new();
        let mut rx = tracker.subscribe_shutdown();
        assert!(!tracker.is_shutting_down());

        tracker.notify_shutdown();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
        assert!(tracker.is_shutting_down());
    }
}
