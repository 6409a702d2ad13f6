//! Cached unread counters.
//!
//! The only long-lived in-process state of the engine. The cache is a
//! hint: a miss falls back to counting from storage, a stale entry dies at
//! its TTL, and every producing event (notification create or view,
//! interaction send or view) invalidates the affected agents proactively.

use std::{collections::HashMap, sync::Arc, time::Duration};

use common::DateTime;
use tokio::sync::RwLock;

use crate::domain::agent;

/// A single cached counter.
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// Cached number of unread items.
    count: u64,

    /// When the counter was stored.
    stored_at: DateTime,
}

/// Cached per-agent unread counters with a fixed TTL.
#[derive(Clone, Debug)]
pub struct UnreadCounters {
    /// Cached entries, keyed by `notifications:<agentId>`.
    entries: Arc<RwLock<HashMap<String, Entry>>>,

    /// Time-to-live of a cached entry.
    ttl: Duration,
}

impl UnreadCounters {
    /// Creates a new empty [`UnreadCounters`] cache with the provided TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Cache key of the provided [`agent::Agent`].
    ///
    /// [`agent::Agent`]: crate::domain::Agent
    #[must_use]
    pub fn key(agent_id: agent::Id) -> String {
        format!("notifications:{agent_id}")
    }

    /// Returns the cached counter of the provided agent, if present and
    /// fresh.
    pub async fn get(&self, agent_id: agent::Id) -> Option<u64> {
        let entries = self.entries.read().await;
        let entry = entries.get(&Self::key(agent_id))?;
        (DateTime::now() - entry.stored_at < self.ttl)
            .then_some(entry.count)
    }

    /// Stores the counter of the provided agent.
    pub async fn put(&self, agent_id: agent::Id, count: u64) {
        let mut entries = self.entries.write().await;
        let _ = entries.insert(
            Self::key(agent_id),
            Entry {
                count,
                stored_at: DateTime::now(),
            },
        );
    }

    /// Drops the cached counter of the provided agent.
    pub async fn invalidate(&self, agent_id: agent::Id) {
        let mut entries = self.entries.write().await;
        let _ = entries.remove(&Self::key(agent_id));
    }

    /// Drops the cached counters of all provided agents.
    pub async fn invalidate_all(
        &self,
        agent_ids: impl IntoIterator<Item = agent::Id>,
    ) {
        let mut entries = self.entries.write().await;
        for agent_id in agent_ids {
            let _ = entries.remove(&Self::key(agent_id));
        }
    }

    /// Indicates whether a counter is cached for the provided agent.
    pub async fn contains(&self, agent_id: agent::Id) -> bool {
        self.entries
            .read()
            .await
            .contains_key(&Self::key(agent_id))
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::domain::agent;

    use super::UnreadCounters;

    #[tokio::test]
    async fn round_trips_within_ttl() {
        let cache = UnreadCounters::new(Duration::from_secs(300));
        let agent = agent::Id::from(7);

        assert_eq!(cache.get(agent).await, None);
        cache.put(agent, 3).await;
        assert_eq!(cache.get(agent).await, Some(3));

        cache.invalidate(agent).await;
        assert_eq!(cache.get(agent).await, None);
        assert!(!cache.contains(agent).await);
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let cache = UnreadCounters::new(Duration::ZERO);
        let agent = agent::Id::from(7);

        cache.put(agent, 3).await;
        assert_eq!(cache.get(agent).await, None);
    }

    #[tokio::test]
    async fn invalidate_all_is_selective() {
        let cache = UnreadCounters::new(Duration::from_secs(300));
        let (a, b, c) =
            (agent::Id::from(1), agent::Id::from(2), agent::Id::from(3));

        cache.put(a, 1).await;
        cache.put(b, 2).await;
        cache.put(c, 3).await;

        cache.invalidate_all([a, b]).await;
        assert_eq!(cache.get(a).await, None);
        assert_eq!(cache.get(b).await, None);
        assert_eq!(cache.get(c).await, Some(3));
    }
}
