//! In-memory registry of search sessions with idle eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dermloc_locator::SharedSession;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Upper bound on concurrently held sessions.
pub const MAX_SESSIONS: usize = 10_000;

/// A session unused for this long is dropped.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Returned by [`SessionStore::insert`] when the store is full of live
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreFull;

/// Live sessions keyed by the id handed out at creation. Every lookup
/// refreshes the session's idle clock.
#[derive(Debug, Clone)]
pub struct SessionStore {
    max_sessions: usize,
    idle_ttl: Duration,
    entries: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS, SESSION_IDLE_TTL)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            max_sessions,
            idle_ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Registers `session` under a fresh id. Idle sessions are evicted
    /// first when the store is at capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFull`] if every slot still holds a live session.
    pub async fn insert(&self, session: SharedSession) -> Result<Uuid, StoreFull> {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.max_sessions {
            let evicted = Self::retain_live(&mut entries, self.idle_ttl);
            if evicted > 0 {
                tracing::debug!(evicted, "evicted idle sessions");
            }
        }
        if entries.len() >= self.max_sessions {
            return Err(StoreFull);
        }

        let id = Uuid::new_v4();
        entries.insert(
            id,
            SessionEntry {
                session,
                last_seen: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id)?;
        if entry.last_seen.elapsed() >= self.idle_ttl {
            entries.remove(&id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    /// Drops every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub async fn evict_idle(&self) -> usize {
        let mut entries = self.entries.write().await;
        Self::retain_live(&mut entries, self.idle_ttl)
    }

    /// Evicts idle sessions every `period` for the life of the process.
    pub fn spawn_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    tracing::info!(evicted, "swept idle sessions");
                }
            }
        })
    }

    fn retain_live(entries: &mut HashMap<Uuid, SessionEntry>, idle_ttl: Duration) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen.elapsed() < idle_ttl);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use dermloc_locator::SearchSession;

    use super::*;

    fn session() -> SharedSession {
        SearchSession::shared(30)
    }

    #[tokio::test]
    async fn full_store_rejects_while_sessions_are_live() {
        let store = SessionStore::new(1, Duration::from_secs(60));
        store.insert(session()).await.unwrap();
        assert_eq!(store.insert(session()).await, Err(StoreFull));
    }

    #[tokio::test]
    async fn idle_sessions_free_their_slots() {
        let store = SessionStore::new(1, Duration::from_millis(50));
        let first = store.insert(session()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        let second = store.insert(session()).await.unwrap();
        assert_ne!(first, second);
        assert!(store.get(first).await.is_none());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn lookup_keeps_a_session_alive() {
        let store = SessionStore::new(10, Duration::from_millis(200));
        let used = store.insert(session()).await.unwrap();
        let idle = store.insert(session()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.get(used).await.is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.evict_idle().await, 1);
        assert!(store.get(used).await.is_some());
        assert!(store.get(idle).await.is_none());
    }

    #[tokio::test]
    async fn remove_reports_whether_session_existed() {
        let store = SessionStore::default();
        let id = store.insert(session()).await.unwrap();
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
    }
}
