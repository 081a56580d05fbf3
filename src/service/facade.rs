//! Queue Service Facade
//!
//! One shared instance composes the lifecycle, group, gateway and metrics
//! components over a single set of collaborators. All methods take `&self`
//! and may be called concurrently from any number of tasks.

use crate::backend::{Collaborators, MetricsSeries};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::gateway::MessageGateway;
use crate::service::groups::GroupAclManager;
use crate::service::lifecycle::QueueLifecycle;
use crate::service::metrics::MetricsReader;
use crate::service::sessions::ConsumerMultiplexer;
use crate::service::types::{
    GroupAcl, GroupConfig, GroupInfo, QueueAudit, QueueInfo, ServiceSettings,
};
use std::sync::Arc;

pub struct QueueService {
    lifecycle: QueueLifecycle,
    groups: GroupAclManager,
    gateway: MessageGateway,
    metrics: MetricsReader,
    sessions: Arc<ConsumerMultiplexer>,
}

impl QueueService {
    pub fn new(settings: ServiceSettings, backend: Collaborators) -> Self {
        let settings = Arc::new(settings);
        let sessions = Arc::new(ConsumerMultiplexer::new(
            Arc::clone(&backend.transport),
            settings.broker_addrs.clone(),
        ));
        log::trace!(
            "queue service over {} broker(s), registry {}",
            settings.broker_addrs.len(),
            settings.registry_addr
        );

        Self {
            lifecycle: QueueLifecycle::new(
                Arc::clone(&backend.registry),
                Arc::clone(&backend.metadata),
                Arc::clone(&settings),
            ),
            groups: GroupAclManager::new(
                Arc::clone(&backend.registry),
                Arc::clone(&backend.metadata),
            ),
            gateway: MessageGateway::new(
                Arc::clone(&backend.registry),
                backend.transport,
                Arc::clone(&backend.metrics),
                Arc::clone(&sessions),
            ),
            metrics: MetricsReader::new(backend.registry, backend.metrics),
            sessions,
        }
    }

    pub async fn create_queue(&self, queue: &str) -> ServiceResult<()> {
        self.lifecycle.create(queue).await
    }

    pub async fn update_queue(&self, queue: &str) -> ServiceResult<()> {
        self.lifecycle.update(queue).await
    }

    pub async fn delete_queue(&self, queue: &str) -> ServiceResult<()> {
        self.lifecycle.delete(queue).await
    }

    pub async fn lookup_queue(&self, queue: &str, group: &str) -> ServiceResult<Vec<QueueInfo>> {
        self.lifecycle.lookup(queue, group).await
    }

    pub async fn add_group(&self, group: &str, queue: &str, acl: GroupAcl) -> ServiceResult<()> {
        self.groups.add_group(group, queue, acl).await
    }

    pub async fn update_group(&self, group: &str, queue: &str, acl: GroupAcl) -> ServiceResult<()> {
        self.groups.update_group(group, queue, acl).await
    }

    pub async fn delete_group(&self, group: &str, queue: &str) -> ServiceResult<()> {
        self.groups.delete_group(group, queue).await
    }

    pub async fn lookup_group(&self, group: &str) -> ServiceResult<Vec<GroupInfo>> {
        self.groups.lookup_group(group).await
    }

    pub async fn get_single_group(
        &self,
        group: &str,
        queue: &str,
    ) -> ServiceResult<Option<GroupConfig>> {
        self.groups.get_single_group(group, queue).await
    }

    pub async fn send_message(&self, queue: &str, group: &str, payload: &[u8]) -> ServiceResult<()> {
        self.gateway.send_message(queue, group, payload).await
    }

    pub async fn receive_message(&self, queue: &str, group: &str) -> ServiceResult<Vec<u8>> {
        self.gateway.receive_message(queue, group).await
    }

    pub async fn ack_message(&self, queue: &str, group: &str) -> ServiceResult<()> {
        self.gateway.ack_message(queue, group).await
    }

    pub async fn get_send_metrics(
        &self,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> ServiceResult<MetricsSeries> {
        self.metrics
            .send_metrics(queue, group, start, end, buckets)
            .await
    }

    pub async fn get_receive_metrics(
        &self,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> ServiceResult<MetricsSeries> {
        self.metrics
            .receive_metrics(queue, group, start, end, buckets)
            .await
    }

    /// Queues present in only one of the two stores
    pub async fn audit_queues(&self) -> ServiceResult<Vec<QueueAudit>> {
        self.lifecycle.audit().await
    }

    /// Live consumer sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.session_count().await
    }

    /// Release the consumer session for (queue, group) if one is cached
    pub async fn close_session(&self, queue: &str, group: &str) -> ServiceResult<bool> {
        self.sessions
            .close_session(queue, group)
            .await
            .map_err(ServiceError::upstream("CloseSession", queue, Some(group)))
    }

    /// Close every consumer session. The service stays usable; later
    /// receives open fresh sessions.
    pub async fn shutdown(&self) {
        let closed = self.sessions.close_all().await;
        log::debug!("queue service shut down, {} session(s) closed", closed);
    }
}
