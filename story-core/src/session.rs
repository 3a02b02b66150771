//! Per-identity workflow sessions and the store that owns them.
//!
//! The store keeps at most one [`Session`] per identity and hands out cloned
//! snapshots, never guarded references, so its internal locks are held only
//! for the map operation itself. Per-identity serialization is provided by a
//! separate lock map: [`SessionStore::lock_identity`] returns an owned guard
//! that callers hold across the whole read-modify-write sequence, including
//! the generation call. Unrelated identities never contend on it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// The stage of the workflow a session is currently refining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Outline,
    Storyline,
    Story,
}

impl Stage {
    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Outline => Some(Stage::Storyline),
            Stage::Storyline => Some(Stage::Story),
            Stage::Story => None,
        }
    }
}

/// One identity's unfinished story workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Original topic, set once at creation.
    pub theme: String,

    /// Accumulated outline text, written while the Outline stage is active.
    pub outline: String,

    /// Accumulated storyline text.
    pub storyline: String,

    /// Accumulated story text.
    pub story: String,

    /// Current active stage.
    pub stage: Stage,
}

impl Session {
    /// Create a fresh session at the Outline stage.
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            outline: String::new(),
            storyline: String::new(),
            story: String::new(),
            stage: Stage::Outline,
        }
    }

    /// The stored content for the given stage.
    pub fn content(&self, stage: Stage) -> &str {
        match stage {
            Stage::Outline => &self.outline,
            Stage::Storyline => &self.storyline,
            Stage::Story => &self.story,
        }
    }

    /// Mutable access to the stored content for the given stage.
    pub fn content_mut(&mut self, stage: Stage) -> &mut String {
        match stage {
            Stage::Outline => &mut self.outline,
            Stage::Storyline => &mut self.storyline,
            Stage::Story => &mut self.story,
        }
    }
}

/// Concurrent session store keyed by identity.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the per-identity lock, creating it on first use.
    ///
    /// The lock map itself is held only for the lookup; the returned guard
    /// serializes operations for this identity alone.
    pub async fn lock_identity(&self, identity: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(identity.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Whether a session exists for the identity.
    pub async fn exists(&self, identity: &str) -> bool {
        self.sessions.read().await.contains_key(identity)
    }

    /// Cloned snapshot of the identity's session, if any.
    pub async fn get(&self, identity: &str) -> Option<Session> {
        self.sessions.read().await.get(identity).cloned()
    }

    /// Insert or replace the identity's session.
    pub async fn insert(&self, identity: &str, session: Session) {
        self.sessions
            .write()
            .await
            .insert(identity.to_string(), session);
    }

    /// Remove the identity's session, returning it if present.
    pub async fn remove(&self, identity: &str) -> Option<Session> {
        self.sessions.write().await.remove(identity)
    }

    /// Reclaim the identity's lock entry if it is idle.
    ///
    /// The entry is dropped only when no session remains and the map holds
    /// the last reference to the lock: every guard and every waiter owns a
    /// clone of the `Arc`, so a count of one proves nobody is using it. The
    /// check runs under the lock-map mutex, the same mutex `lock_identity`
    /// clones under, so a removal cannot race a new acquisition.
    pub async fn prune_lock(&self, identity: &str) {
        if self.sessions.read().await.contains_key(identity) {
            return;
        }
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(identity) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(identity);
            }
        }
    }

    /// Number of per-identity lock entries currently retained.
    pub async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Outline.next(), Some(Stage::Storyline));
        assert_eq!(Stage::Storyline.next(), Some(Stage::Story));
        assert_eq!(Stage::Story.next(), None);
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new("a robot learns empathy");
        assert_eq!(session.theme, "a robot learns empathy");
        assert_eq!(session.stage, Stage::Outline);
        assert!(session.outline.is_empty());
        assert!(session.storyline.is_empty());
        assert!(session.story.is_empty());
    }

    #[test]
    fn test_content_accessors() {
        let mut session = Session::new("theme");
        session.content_mut(Stage::Storyline).push_str("plot");
        assert_eq!(session.content(Stage::Storyline), "plot");
        assert_eq!(session.storyline, "plot");
        assert!(session.content(Stage::Outline).is_empty());
    }

    #[tokio::test]
    async fn test_store_crud() {
        let store = SessionStore::new();
        assert!(!store.exists("alice").await);

        store.insert("alice", Session::new("dragons")).await;
        assert!(store.exists("alice").await);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("alice").await.unwrap().theme, "dragons");

        let removed = store.remove("alice").await;
        assert_eq!(removed.unwrap().theme, "dragons");
        assert!(store.is_empty().await);
        assert!(store.remove("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_one_session_per_identity() {
        let store = SessionStore::new();
        store.insert("bob", Session::new("first")).await;
        store.insert("bob", Session::new("second")).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("bob").await.unwrap().theme, "second");
    }

    #[tokio::test]
    async fn test_prune_reclaims_idle_lock() {
        let store = SessionStore::new();

        let guard = store.lock_identity("alice").await;
        assert_eq!(store.lock_count().await, 1);

        // Held guard: the entry must survive.
        store.prune_lock("alice").await;
        assert_eq!(store.lock_count().await, 1);

        drop(guard);

        // Live session: the entry must survive.
        store.insert("alice", Session::new("dragons")).await;
        store.prune_lock("alice").await;
        assert_eq!(store.lock_count().await, 1);

        // No session, no guard: the entry is reclaimed.
        store.remove("alice").await;
        store.prune_lock("alice").await;
        assert_eq!(store.lock_count().await, 0);

        // A later acquisition recreates it on demand.
        let _guard = store.lock_identity("alice").await;
        assert_eq!(store.lock_count().await, 1);
    }

    #[tokio::test]
    async fn test_lock_map_does_not_accumulate() {
        let store = SessionStore::new();

        for i in 0..100 {
            let identity = format!("user-{i}");
            let guard = store.lock_identity(&identity).await;
            store.insert(&identity, Session::new("theme")).await;
            store.remove(&identity).await;
            drop(guard);
            store.prune_lock(&identity).await;
        }

        assert!(store.is_empty().await);
        assert_eq!(store.lock_count().await, 0);
    }

    #[tokio::test]
    async fn test_identity_lock_serializes() {
        let store = Arc::new(SessionStore::new());

        let guard = store.lock_identity("carol").await;
        let contender = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let _guard = store.lock_identity("carol").await;
            })
        };

        // Other identities are not blocked by carol's guard.
        let _other = store.lock_identity("dave").await;

        drop(guard);
        contender.await.unwrap();
    }
}
