//! In-process extended metadata store
//!
//! Queue records carry their creation time; group records are nested under
//! their queue so removing a queue removes its groups. The queue→groups and
//! group→queues indexes are derived from that nesting on every read.

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::traits::MetadataStore;
use crate::backend::types::GroupRecord;
use crate::core::sync::handle_mutex_poison;
use crate::core::time::{SystemTimeProvider, TimeProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub ctime: i64,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupRecord>,
}

/// Serializable contents of the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataState {
    #[serde(default)]
    pub queues: BTreeMap<String, QueueEntry>,
}

pub struct MemoryMetadataStore {
    state: Mutex<MetadataState>,
    clock: Arc<dyn TimeProvider>,
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::with_state(MetadataState::default(), Arc::new(SystemTimeProvider))
    }

    pub fn with_state(state: MetadataState, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            state: Mutex::new(state),
            clock,
        }
    }

    pub fn snapshot(&self) -> BackendResult<MetadataState> {
        Ok(self.lock()?.clone())
    }

    pub fn group_record_count(&self) -> BackendResult<usize> {
        Ok(self
            .lock()?
            .queues
            .values()
            .map(|entry| entry.groups.len())
            .sum())
    }

    fn lock(&self) -> BackendResult<MutexGuard<'_, MetadataState>> {
        handle_mutex_poison(self.state.lock(), BackendError::Internal)
    }
}

fn missing_queue(name: &str) -> BackendError {
    BackendError::NotFound(format!("queue '{}'", name))
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn exist_queue(&self, name: &str) -> BackendResult<bool> {
        Ok(self.lock()?.queues.contains_key(name))
    }

    async fn add_queue(&self, name: &str) -> BackendResult<()> {
        let ctime = self.clock.unix_seconds();
        let mut state = self.lock()?;
        if state.queues.contains_key(name) {
            return Err(BackendError::Conflict(format!("queue '{}'", name)));
        }
        state.queues.insert(
            name.to_string(),
            QueueEntry {
                ctime,
                groups: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn del_queue(&self, name: &str) -> BackendResult<()> {
        self.lock()?
            .queues
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing_queue(name))
    }

    async fn queue_create_time(&self, name: &str) -> BackendResult<i64> {
        self.lock()?
            .queues
            .get(name)
            .map(|entry| entry.ctime)
            .ok_or_else(|| missing_queue(name))
    }

    async fn get_queue_map(&self) -> BackendResult<BTreeMap<String, Vec<String>>> {
        Ok(self
            .lock()?
            .queues
            .iter()
            .map(|(queue, entry)| (queue.clone(), entry.groups.keys().cloned().collect()))
            .collect())
    }

    async fn get_group_map(&self) -> BackendResult<BTreeMap<String, Vec<String>>> {
        let state = self.lock()?;
        let mut group_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (queue, entry) in &state.queues {
            for group in entry.groups.keys() {
                group_map
                    .entry(group.clone())
                    .or_default()
                    .push(queue.clone());
            }
        }
        Ok(group_map)
    }

    async fn add_group_config(&self, record: &GroupRecord) -> BackendResult<()> {
        let mut state = self.lock()?;
        let entry = state
            .queues
            .get_mut(&record.queue)
            .ok_or_else(|| missing_queue(&record.queue))?;
        if entry.groups.contains_key(&record.group) {
            return Err(BackendError::Conflict(format!(
                "group '{}' on queue '{}'",
                record.group, record.queue
            )));
        }
        entry.groups.insert(record.group.clone(), record.clone());
        Ok(())
    }

    async fn update_group_config(&self, record: &GroupRecord) -> BackendResult<()> {
        let mut state = self.lock()?;
        let entry = state
            .queues
            .get_mut(&record.queue)
            .ok_or_else(|| missing_queue(&record.queue))?;
        match entry.groups.get_mut(&record.group) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(BackendError::NotFound(format!(
                "group '{}' on queue '{}'",
                record.group, record.queue
            ))),
        }
    }

    async fn delete_group_config(&self, group: &str, queue: &str) -> BackendResult<()> {
        let mut state = self.lock()?;
        let entry = state
            .queues
            .get_mut(queue)
            .ok_or_else(|| missing_queue(queue))?;
        entry.groups.remove(group).map(|_| ()).ok_or_else(|| {
            BackendError::NotFound(format!("group '{}' on queue '{}'", group, queue))
        })
    }

    async fn get_group_config(
        &self,
        group: &str,
        queue: &str,
    ) -> BackendResult<Option<GroupRecord>> {
        Ok(self
            .lock()?
            .queues
            .get(queue)
            .and_then(|entry| entry.groups.get(group))
            .cloned())
    }
}
