//! In-memory collaborators
//!
//! Every collaborator interface has an in-process implementation here. They
//! back the `queuegate` binary (optionally persisted to a JSON state file
//! between invocations) and the service tests.

mod metadata;
mod metrics;
mod registry;
mod transport;

pub use metadata::{MemoryMetadataStore, MetadataState, QueueEntry};
pub use metrics::{CountedEvent, GroupCounters, MemoryMetrics, MetricsState};
pub use registry::{MemoryRegistry, TopicLayout};
pub use transport::{MemoryTransport, TransportState};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::Collaborators;
use crate::core::time::{SystemTimeProvider, TimeProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Saved state of all in-memory collaborators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub topics: BTreeMap<String, TopicLayout>,
    #[serde(default)]
    pub metadata: MetadataState,
    #[serde(default)]
    pub transport: TransportState,
    #[serde(default)]
    pub metrics: MetricsState,
}

/// The four in-memory collaborators wired together
#[derive(Clone)]
pub struct MemoryBackend {
    pub registry: Arc<MemoryRegistry>,
    pub metadata: Arc<MemoryMetadataStore>,
    pub transport: Arc<MemoryTransport>,
    pub metrics: Arc<MemoryMetrics>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::from_snapshot(MemorySnapshot::default(), Arc::new(SystemTimeProvider))
    }

    pub fn from_snapshot(snapshot: MemorySnapshot, clock: Arc<dyn TimeProvider>) -> Self {
        let registry = Arc::new(MemoryRegistry::from_topics(snapshot.topics));
        Self {
            transport: Arc::new(MemoryTransport::with_state(
                Arc::clone(&registry),
                snapshot.transport,
            )),
            metadata: Arc::new(MemoryMetadataStore::with_state(
                snapshot.metadata,
                Arc::clone(&clock),
            )),
            metrics: Arc::new(MemoryMetrics::with_state(snapshot.metrics, clock)),
            registry,
        }
    }

    pub fn snapshot(&self) -> BackendResult<MemorySnapshot> {
        Ok(MemorySnapshot {
            topics: self.registry.snapshot()?,
            metadata: self.metadata.snapshot()?,
            transport: self.transport.snapshot()?,
            metrics: self.metrics.snapshot()?,
        })
    }

    /// Trait-object handles for the service
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            registry: self.registry.clone(),
            metadata: self.metadata.clone(),
            transport: self.transport.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Load state from `path`; a missing file yields an empty backend
    pub async fn load(path: &Path) -> BackendResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let snapshot: MemorySnapshot = serde_json::from_str(&contents).map_err(|e| {
                    BackendError::Internal(format!(
                        "corrupt state file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                log::debug!("loaded state from {}", path.display());
                Ok(Self::from_snapshot(snapshot, Arc::new(SystemTimeProvider)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no state file at {}, starting empty", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(BackendError::Unavailable(format!(
                "cannot read state file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn save(&self, path: &Path) -> BackendResult<()> {
        let contents = serde_json::to_string_pretty(&self.snapshot()?)
            .map_err(|e| BackendError::Internal(format!("cannot encode state: {}", e)))?;
        tokio::fs::write(path, contents).await.map_err(|e| {
            BackendError::Unavailable(format!(
                "cannot write state file {}: {}",
                path.display(),
                e
            ))
        })
    }
}
