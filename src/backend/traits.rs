//! Collaborator Interfaces
//!
//! The service core talks to four independently failing collaborators:
//!
//! - [`BrokerRegistry`]: authoritative topic existence and physical layout
//! - [`MetadataStore`]: queue creation times, group ACL records and the
//!   queue↔group indexes
//! - [`MessageTransport`]: produce, and open per-(queue, group) consumer sessions
//! - [`MetricsRecorder`]: counted send/receive events and bucketed queries
//!
//! Implementations must be safe to share between tasks; the core holds them
//! behind `Arc<dyn ...>` and calls them concurrently without extra locking.

use crate::backend::error::BackendResult;
use crate::backend::types::{Direction, GroupRecord, MetricsSeries};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Broker-side topic registry
#[async_trait]
pub trait BrokerRegistry: Send + Sync {
    /// Whether `name` exists. With `force_refresh` the answer reflects the
    /// registry's latest state; without it a cached view may be used.
    async fn exist_topic(&self, name: &str, force_refresh: bool) -> BackendResult<bool>;

    async fn create_topic(
        &self,
        name: &str,
        replications: u32,
        partitions: u32,
        registry_addr: &str,
    ) -> BackendResult<()>;

    async fn delete_topic(&self, name: &str, registry_addr: &str) -> BackendResult<()>;

    /// Every topic name, sorted
    async fn list_topics(&self, force_refresh: bool) -> BackendResult<Vec<String>>;
}

/// Extended metadata store holding everything the broker does not
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn exist_queue(&self, name: &str) -> BackendResult<bool>;
    async fn add_queue(&self, name: &str) -> BackendResult<()>;
    async fn del_queue(&self, name: &str) -> BackendResult<()>;

    /// Creation time of the queue record, Unix seconds
    async fn queue_create_time(&self, name: &str) -> BackendResult<i64>;

    /// queue -> names of its groups
    async fn get_queue_map(&self) -> BackendResult<BTreeMap<String, Vec<String>>>;

    /// group -> names of the queues it is attached to
    async fn get_group_map(&self) -> BackendResult<BTreeMap<String, Vec<String>>>;

    async fn add_group_config(&self, record: &GroupRecord) -> BackendResult<()>;
    async fn update_group_config(&self, record: &GroupRecord) -> BackendResult<()>;
    async fn delete_group_config(&self, group: &str, queue: &str) -> BackendResult<()>;

    /// `Ok(None)` when no record exists for the pair
    async fn get_group_config(&self, group: &str, queue: &str)
        -> BackendResult<Option<GroupRecord>>;
}

/// A long-lived handle pulling messages for one (queue, group) pair
#[async_trait]
pub trait ConsumerSession: Send + Sync {
    /// Wait for and return the next message
    async fn receive(&self) -> BackendResult<Vec<u8>>;

    /// Release the session; pending and later receives fail
    async fn close(&self) -> BackendResult<()>;
}

/// Message producer and consumer-session factory
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn produce(&self, queue: &str, payload: &[u8]) -> BackendResult<()>;

    async fn open_consumer_session(
        &self,
        addrs: &[String],
        queue: &str,
        group: &str,
    ) -> BackendResult<Arc<dyn ConsumerSession>>;
}

/// Time-series counter store for message volume
#[async_trait]
pub trait MetricsRecorder: Send + Sync {
    /// Count `count` events now. Recording is best effort and never fails
    /// the message operation that triggered it.
    async fn record(&self, direction: Direction, queue: &str, group: &str, count: u64);

    /// Split `[start, end)` into `buckets` chronological intervals
    async fn query(
        &self,
        direction: Direction,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> BackendResult<MetricsSeries>;

    async fn record_send(&self, queue: &str, group: &str, count: u64) {
        self.record(Direction::Send, queue, group, count).await
    }

    async fn record_receive(&self, queue: &str, group: &str, count: u64) {
        self.record(Direction::Receive, queue, group, count).await
    }

    async fn query_send(
        &self,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> BackendResult<MetricsSeries> {
        self.query(Direction::Send, queue, group, start, end, buckets)
            .await
    }

    async fn query_receive(
        &self,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> BackendResult<MetricsSeries> {
        self.query(Direction::Receive, queue, group, start, end, buckets)
            .await
    }
}
