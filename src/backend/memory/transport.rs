//! In-process message transport
//!
//! Each queue is an append-only log. Consumer groups track a committed
//! offset per queue and start from the oldest retained message. Sessions
//! block in `receive` until a message is produced or the session is closed.
//! A log belongs to one incarnation of its registry topic; when the topic is
//! deleted and recreated the old messages and offsets are dropped.

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::memory::registry::MemoryRegistry;
use crate::backend::traits::{ConsumerSession, MessageTransport};
use crate::core::sync::handle_mutex_poison;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// Serializable contents of the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportState {
    /// queue -> messages in produce order
    #[serde(default)]
    pub logs: BTreeMap<String, Vec<Vec<u8>>>,
    /// queue -> group -> next offset to deliver
    #[serde(default)]
    pub offsets: BTreeMap<String, BTreeMap<String, usize>>,
    /// queue -> registry incarnation the log above belongs to
    #[serde(skip)]
    pub incarnations: BTreeMap<String, u64>,
}

impl TransportState {
    /// Attach `queue` to `incarnation`, purging data from an earlier one
    fn bind(&mut self, queue: &str, incarnation: u64) {
        match self.incarnations.insert(queue.to_string(), incarnation) {
            Some(previous) if previous != incarnation => {
                self.logs.remove(queue);
                self.offsets.remove(queue);
                log::debug!("purged log of deleted topic '{}'", queue);
            }
            _ => {}
        }
    }
}

struct TransportInner {
    state: Mutex<TransportState>,
    produced: Notify,
}

impl TransportInner {
    fn lock(&self) -> BackendResult<MutexGuard<'_, TransportState>> {
        handle_mutex_poison(self.state.lock(), BackendError::Internal)
    }
}

pub struct MemoryTransport {
    inner: Arc<TransportInner>,
    registry: Arc<MemoryRegistry>,
    sessions_opened: AtomicUsize,
}

impl MemoryTransport {
    pub fn new(registry: Arc<MemoryRegistry>) -> Self {
        Self::with_state(registry, TransportState::default())
    }

    pub fn with_state(registry: Arc<MemoryRegistry>, state: TransportState) -> Self {
        Self {
            inner: Arc::new(TransportInner {
                state: Mutex::new(state),
                produced: Notify::new(),
            }),
            registry,
            sessions_opened: AtomicUsize::new(0),
        }
    }

    /// Saved form: logs of topics the registry still holds
    pub fn snapshot(&self) -> BackendResult<TransportState> {
        let topics = self.registry.snapshot()?;
        let state = self.inner.lock()?;
        Ok(TransportState {
            logs: state
                .logs
                .iter()
                .filter(|(queue, _)| topics.contains_key(*queue))
                .map(|(queue, log)| (queue.clone(), log.clone()))
                .collect(),
            offsets: state
                .offsets
                .iter()
                .filter(|(queue, _)| topics.contains_key(*queue))
                .map(|(queue, groups)| (queue.clone(), groups.clone()))
                .collect(),
            incarnations: BTreeMap::new(),
        })
    }

    /// Number of consumer sessions opened through this transport
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    /// Messages not yet delivered to `group`
    pub fn pending(&self, queue: &str, group: &str) -> BackendResult<usize> {
        let Some(incarnation) = self.registry.incarnation(queue)? else {
            return Ok(0);
        };
        let mut state = self.inner.lock()?;
        state.bind(queue, incarnation);
        let produced = state.logs.get(queue).map_or(0, Vec::len);
        let delivered = state
            .offsets
            .get(queue)
            .and_then(|groups| groups.get(group))
            .copied()
            .unwrap_or(0);
        Ok(produced.saturating_sub(delivered))
    }

    fn ensure_topic(&self, queue: &str) -> BackendResult<u64> {
        live_incarnation(&self.registry, queue)
    }
}

fn live_incarnation(registry: &MemoryRegistry, queue: &str) -> BackendResult<u64> {
    registry
        .incarnation(queue)?
        .ok_or_else(|| BackendError::NotFound(format!("topic '{}'", queue)))
}

#[async_trait]
impl MessageTransport for MemoryTransport {
    async fn produce(&self, queue: &str, payload: &[u8]) -> BackendResult<()> {
        let incarnation = self.ensure_topic(queue)?;
        let mut state = self.inner.lock()?;
        state.bind(queue, incarnation);
        state
            .logs
            .entry(queue.to_string())
            .or_default()
            .push(payload.to_vec());
        drop(state);
        self.inner.produced.notify_waiters();
        Ok(())
    }

    async fn open_consumer_session(
        &self,
        addrs: &[String],
        queue: &str,
        group: &str,
    ) -> BackendResult<Arc<dyn ConsumerSession>> {
        if addrs.is_empty() {
            return Err(BackendError::Unavailable(
                "no broker addresses configured".to_string(),
            ));
        }
        let incarnation = self.ensure_topic(queue)?;
        self.inner.lock()?.bind(queue, incarnation);
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "opened consumer session {}@{} via {}",
            queue,
            group,
            addrs.join(",")
        );
        Ok(Arc::new(MemorySession {
            queue: queue.to_string(),
            group: group.to_string(),
            inner: Arc::clone(&self.inner),
            registry: Arc::clone(&self.registry),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MemorySession {
    queue: String,
    group: String,
    inner: Arc<TransportInner>,
    registry: Arc<MemoryRegistry>,
    closed: AtomicBool,
}

impl MemorySession {
    fn try_take(&self) -> BackendResult<Option<Vec<u8>>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BackendError::Closed(format!("{}@{}", self.queue, self.group)));
        }
        let incarnation = live_incarnation(&self.registry, &self.queue)?;
        let mut state = self.inner.lock()?;
        state.bind(&self.queue, incarnation);
        let TransportState { logs, offsets, .. } = &mut *state;
        let offset = offsets
            .entry(self.queue.clone())
            .or_default()
            .entry(self.group.clone())
            .or_insert(0);
        let next = logs
            .get(&self.queue)
            .and_then(|log| log.get(*offset))
            .cloned();
        if next.is_some() {
            *offset += 1;
        }
        Ok(next)
    }
}

#[async_trait]
impl ConsumerSession for MemorySession {
    async fn receive(&self) -> BackendResult<Vec<u8>> {
        loop {
            // Register interest before checking so a produce in between is not missed
            let notified = self.inner.produced.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(payload) = self.try_take()? {
                return Ok(payload);
            }
            notified.await;
        }
    }

    async fn close(&self) -> BackendResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.produced.notify_waiters();
        Ok(())
    }
}
