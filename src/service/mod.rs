//! Managed Queue Service
//!
//! A façade over a partitioned log broker that adds per-queue metadata and
//! per-group access control. Queues live in two independent stores, the
//! broker registry (topics) and the extended metadata store (creation time,
//! group ACL records), which this module keeps in step with ordered writes.
//!
//! # Components
//!
//! - [`lifecycle::QueueLifecycle`]: create, update, delete, lookup and audit queues
//! - [`groups::GroupAclManager`]: group ACL records per (group, queue)
//! - [`sessions::ConsumerMultiplexer`]: one consumer session per `queue@group`
//! - [`gateway::MessageGateway`]: send, receive and ack
//! - [`metrics::MetricsReader`]: bucketed send/receive counts
//! - [`facade::QueueService`]: all of the above behind one shared instance
//!
//! # Existence checks
//!
//! Lifecycle, group and metrics operations refresh the broker registry before
//! deciding whether a queue exists. Send and receive accept the registry's
//! cached view.
//!
//! # Example
//!
//! ```rust,no_run
//! use queuegate::backend::memory::MemoryBackend;
//! use queuegate::service::api::{GroupAcl, QueueService, ServiceSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MemoryBackend::new();
//! let service = QueueService::new(
//!     ServiceSettings {
//!         broker_addrs: vec!["localhost:9092".to_string()],
//!         registry_addr: "localhost:2181".to_string(),
//!         partitions: 16,
//!         replications: 2,
//!     },
//!     backend.collaborators(),
//! );
//!
//! service.create_queue("orders").await?;
//! service
//!     .add_group("billing", "orders", GroupAcl { read: true, ..Default::default() })
//!     .await?;
//! service.send_message("orders", "billing", b"hello").await?;
//! let payload = service.receive_message("orders", "billing").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod existence;
pub mod facade;
pub mod gateway;
pub mod groups;
pub mod lifecycle;
pub mod metrics;
pub mod sessions;
pub mod types;

use crate::core::validation::validate_name;
use error::{ServiceError, ServiceResult};

/// Reject a malformed queue or group name with `InvalidArgument`
pub(crate) fn require_name(kind: &str, value: &str) -> ServiceResult<()> {
    validate_name(kind, value).map_err(ServiceError::invalid)
}

#[cfg(test)]
mod tests;
