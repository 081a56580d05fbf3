//! In-process broker registry
//!
//! Keeps an authoritative topic table plus a cached name view, the way a
//! broker client caches cluster metadata. Writes only touch the
//! authoritative table; the cache catches up on refresh. A non-refreshing
//! lookup answers from the cache and refreshes once on a miss, so a topic
//! deleted since the last refresh still reads as present until then.
//!
//! Every create hands the topic a fresh incarnation number, so holders of
//! per-topic data can tell a recreated topic from the one that was deleted.

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::traits::BrokerRegistry;
use crate::core::sync::handle_mutex_poison;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Physical layout of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLayout {
    pub partitions: u32,
    pub replications: u32,
}

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    topics: Mutex<BTreeMap<String, TopicLayout>>,
    cached: Mutex<BTreeSet<String>>,
    incarnations: Mutex<BTreeMap<String, u64>>,
    next_incarnation: AtomicU64,
    refreshes: AtomicUsize,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from saved topics; the cache starts cold
    pub fn from_topics(topics: BTreeMap<String, TopicLayout>) -> Self {
        let incarnations: BTreeMap<String, u64> = topics.keys().cloned().zip(1..).collect();
        Self {
            next_incarnation: AtomicU64::new(incarnations.len() as u64 + 1),
            incarnations: Mutex::new(incarnations),
            topics: Mutex::new(topics),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> BackendResult<BTreeMap<String, TopicLayout>> {
        Ok(self.lock_topics()?.clone())
    }

    pub fn topic_layout(&self, name: &str) -> BackendResult<Option<TopicLayout>> {
        Ok(self.lock_topics()?.get(name).copied())
    }

    /// Authoritative existence, bypassing the cache
    pub fn has_topic(&self, name: &str) -> BackendResult<bool> {
        Ok(self.lock_topics()?.contains_key(name))
    }

    /// Incarnation of a live topic; `None` once it is deleted
    pub fn incarnation(&self, name: &str) -> BackendResult<Option<u64>> {
        Ok(self.lock_incarnations()?.get(name).copied())
    }

    /// Number of cache refreshes performed so far
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn lock_topics(
        &self,
    ) -> BackendResult<std::sync::MutexGuard<'_, BTreeMap<String, TopicLayout>>> {
        handle_mutex_poison(self.topics.lock(), BackendError::Internal)
    }

    fn lock_incarnations(
        &self,
    ) -> BackendResult<std::sync::MutexGuard<'_, BTreeMap<String, u64>>> {
        handle_mutex_poison(self.incarnations.lock(), BackendError::Internal)
    }

    fn refresh(&self) -> BackendResult<()> {
        let names: BTreeSet<String> = self.lock_topics()?.keys().cloned().collect();
        *handle_mutex_poison(self.cached.lock(), BackendError::Internal)? = names;
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn cached_contains(&self, name: &str) -> BackendResult<bool> {
        Ok(handle_mutex_poison(self.cached.lock(), BackendError::Internal)?.contains(name))
    }
}

#[async_trait]
impl BrokerRegistry for MemoryRegistry {
    async fn exist_topic(&self, name: &str, force_refresh: bool) -> BackendResult<bool> {
        if force_refresh {
            self.refresh()?;
            return self.cached_contains(name);
        }
        if self.cached_contains(name)? {
            return Ok(true);
        }
        self.refresh()?;
        self.cached_contains(name)
    }

    async fn create_topic(
        &self,
        name: &str,
        replications: u32,
        partitions: u32,
        registry_addr: &str,
    ) -> BackendResult<()> {
        let mut topics = self.lock_topics()?;
        if topics.contains_key(name) {
            return Err(BackendError::Conflict(format!("topic '{}'", name)));
        }
        topics.insert(
            name.to_string(),
            TopicLayout {
                partitions,
                replications,
            },
        );
        let incarnation = self.next_incarnation.fetch_add(1, Ordering::SeqCst);
        self.lock_incarnations()?.insert(name.to_string(), incarnation);
        log::debug!(
            "registry {}: created topic '{}' ({} partitions, {} replicas)",
            registry_addr,
            name,
            partitions,
            replications
        );
        Ok(())
    }

    async fn delete_topic(&self, name: &str, registry_addr: &str) -> BackendResult<()> {
        let mut topics = self.lock_topics()?;
        match topics.remove(name) {
            Some(_) => {
                self.lock_incarnations()?.remove(name);
                log::debug!("registry {}: deleted topic '{}'", registry_addr, name);
                Ok(())
            }
            None => Err(BackendError::NotFound(format!("topic '{}'", name))),
        }
    }

    async fn list_topics(&self, force_refresh: bool) -> BackendResult<Vec<String>> {
        if force_refresh {
            self.refresh()?;
        }
        let cached = handle_mutex_poison(self.cached.lock(), BackendError::Internal)?;
        Ok(cached.iter().cloned().collect())
    }
}
