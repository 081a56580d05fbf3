//! Shared fixtures for service tests

use crate::backend::memory::{MemoryBackend, MemorySnapshot};
use crate::backend::{
    BackendError, BackendResult, BrokerRegistry, Collaborators, ConsumerSession, GroupRecord,
    MessageTransport, MetadataStore,
};
use crate::core::time::MockTimeProvider;
use crate::service::error::ServiceError;
use crate::service::facade::QueueService;
use crate::service::types::{GroupAcl, ServiceSettings};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock start for every harness
pub const START: i64 = 1_700_000_000;

pub fn settings() -> ServiceSettings {
    ServiceSettings {
        broker_addrs: vec!["broker-1:9092".to_string(), "broker-2:9092".to_string()],
        registry_addr: "zk-1:2181".to_string(),
        partitions: 4,
        replications: 2,
    }
}

pub fn acl(write: bool, read: bool) -> GroupAcl {
    GroupAcl {
        write,
        read,
        url: "http://hooks.local/callback".to_string(),
        ips: vec!["10.0.0.1".to_string()],
    }
}

pub struct Harness {
    pub backend: MemoryBackend,
    pub clock: MockTimeProvider,
    pub service: QueueService,
}

fn memory_backend() -> (MemoryBackend, MockTimeProvider) {
    let clock = MockTimeProvider::new(START);
    let backend = MemoryBackend::from_snapshot(MemorySnapshot::default(), Arc::new(clock.clone()));
    (backend, clock)
}

pub fn harness() -> Harness {
    harness_with(|collaborators| collaborators)
}

/// Build a harness whose collaborators are rewired by `wire` before the
/// service is constructed
pub fn harness_with(wire: impl FnOnce(Collaborators) -> Collaborators) -> Harness {
    let (backend, clock) = memory_backend();
    let service = QueueService::new(settings(), wire(backend.collaborators()));
    Harness {
        backend,
        clock,
        service,
    }
}

/// Harness whose broker registry fails on demand
pub fn flaky_harness() -> (Harness, Arc<FlakyRegistry>) {
    let (backend, clock) = memory_backend();
    let registry = Arc::new(FlakyRegistry::new(backend.registry.clone()));
    let mut collaborators = backend.collaborators();
    collaborators.registry = registry.clone();
    let service = QueueService::new(settings(), collaborators);
    (
        Harness {
            backend,
            clock,
            service,
        },
        registry,
    )
}

/// Harness whose transport opens sessions slowly and counts them
pub fn slow_open_harness(delay: Duration) -> (Harness, Arc<SlowOpenTransport>) {
    let (backend, clock) = memory_backend();
    let transport = Arc::new(SlowOpenTransport::new(backend.transport.clone(), delay));
    let mut collaborators = backend.collaborators();
    collaborators.transport = transport.clone();
    let service = QueueService::new(settings(), collaborators);
    (
        Harness {
            backend,
            clock,
            service,
        },
        transport,
    )
}

/// The collaborator error wrapped by an `Upstream` failure
pub fn upstream_source(err: &ServiceError) -> Option<&BackendError> {
    match err {
        ServiceError::Upstream { source, .. } => Some(source),
        _ => None,
    }
}

/// Registry wrapper with switchable failures on writes
pub struct FlakyRegistry {
    inner: Arc<dyn BrokerRegistry>,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FlakyRegistry {
    pub fn new(inner: Arc<dyn BrokerRegistry>) -> Self {
        Self {
            inner,
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BrokerRegistry for FlakyRegistry {
    async fn exist_topic(&self, name: &str, force_refresh: bool) -> BackendResult<bool> {
        self.inner.exist_topic(name, force_refresh).await
    }

    async fn create_topic(
        &self,
        name: &str,
        replications: u32,
        partitions: u32,
        registry_addr: &str,
    ) -> BackendResult<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("registry timeout".to_string()));
        }
        self.inner
            .create_topic(name, replications, partitions, registry_addr)
            .await
    }

    async fn delete_topic(&self, name: &str, registry_addr: &str) -> BackendResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("registry timeout".to_string()));
        }
        self.inner.delete_topic(name, registry_addr).await
    }

    async fn list_topics(&self, force_refresh: bool) -> BackendResult<Vec<String>> {
        self.inner.list_topics(force_refresh).await
    }
}

/// Transport wrapper that delays session construction and counts it
pub struct SlowOpenTransport {
    inner: Arc<dyn MessageTransport>,
    delay: Duration,
    opened: AtomicUsize,
}

impl SlowOpenTransport {
    pub fn new(inner: Arc<dyn MessageTransport>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            opened: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageTransport for SlowOpenTransport {
    async fn produce(&self, queue: &str, payload: &[u8]) -> BackendResult<()> {
        self.inner.produce(queue, payload).await
    }

    async fn open_consumer_session(
        &self,
        addrs: &[String],
        queue: &str,
        group: &str,
    ) -> BackendResult<Arc<dyn ConsumerSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.open_consumer_session(addrs, queue, group).await
    }
}

/// Metadata wrapper whose queue index lists one extra group that has no
/// config record
pub struct PhantomIndexMetadata {
    inner: Arc<dyn MetadataStore>,
    queue: String,
    group: String,
}

impl PhantomIndexMetadata {
    pub fn new(inner: Arc<dyn MetadataStore>, queue: &str, group: &str) -> Self {
        Self {
            inner,
            queue: queue.to_string(),
            group: group.to_string(),
        }
    }
}

#[async_trait]
impl MetadataStore for PhantomIndexMetadata {
    async fn exist_queue(&self, name: &str) -> BackendResult<bool> {
        self.inner.exist_queue(name).await
    }

    async fn add_queue(&self, name: &str) -> BackendResult<()> {
        self.inner.add_queue(name).await
    }

    async fn del_queue(&self, name: &str) -> BackendResult<()> {
        self.inner.del_queue(name).await
    }

    async fn queue_create_time(&self, name: &str) -> BackendResult<i64> {
        self.inner.queue_create_time(name).await
    }

    async fn get_queue_map(&self) -> BackendResult<BTreeMap<String, Vec<String>>> {
        let mut map = self.inner.get_queue_map().await?;
        if let Some(groups) = map.get_mut(&self.queue) {
            groups.push(self.group.clone());
        }
        Ok(map)
    }

    async fn get_group_map(&self) -> BackendResult<BTreeMap<String, Vec<String>>> {
        let mut map = self.inner.get_group_map().await?;
        map.entry(self.group.clone())
            .or_default()
            .push(self.queue.clone());
        Ok(map)
    }

    async fn add_group_config(&self, record: &GroupRecord) -> BackendResult<()> {
        self.inner.add_group_config(record).await
    }

    async fn update_group_config(&self, record: &GroupRecord) -> BackendResult<()> {
        self.inner.update_group_config(record).await
    }

    async fn delete_group_config(&self, group: &str, queue: &str) -> BackendResult<()> {
        self.inner.delete_group_config(group, queue).await
    }

    async fn get_group_config(
        &self,
        group: &str,
        queue: &str,
    ) -> BackendResult<Option<GroupRecord>> {
        self.inner.get_group_config(group, queue).await
    }
}
