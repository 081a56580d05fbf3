//! External collaborators of the queue service
//!
//! Narrow async interfaces to the broker registry, the extended metadata
//! store, the message transport and the metrics recorder, plus in-memory
//! implementations of each.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{BackendError, BackendResult};
pub use traits::{BrokerRegistry, ConsumerSession, MessageTransport, MetadataStore, MetricsRecorder};
pub use types::{Direction, GroupRecord, MetricsBucket, MetricsSeries};

use std::sync::Arc;

/// Shared handles to every collaborator the service needs
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn BrokerRegistry>,
    pub metadata: Arc<dyn MetadataStore>,
    pub transport: Arc<dyn MessageTransport>,
    pub metrics: Arc<dyn MetricsRecorder>,
}
