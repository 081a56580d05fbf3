//! Public API for the queue service
//!
//! External modules should import from here rather than directly from the
//! internal modules.

use std::sync::{Arc, LazyLock};
use tokio::sync::RwLock;

// Facade and its components
pub use crate::service::facade::QueueService;
pub use crate::service::gateway::MessageGateway;
pub use crate::service::groups::GroupAclManager;
pub use crate::service::lifecycle::QueueLifecycle;
pub use crate::service::metrics::MetricsReader;
pub use crate::service::sessions::{session_key, ConsumerMultiplexer};

// Existence check freshness
pub use crate::service::existence::ExistenceCheck;

// Error handling
pub use crate::service::error::{ServiceError, ServiceResult};

// Settings and response shapes
pub use crate::service::types::{
    GroupAcl, GroupConfig, GroupInfo, Inconsistency, QueueAudit, QueueInfo, ServiceSettings,
};

/// Process-wide service instance, installed once at startup
static QUEUE_SERVICE: LazyLock<RwLock<Option<Arc<QueueService>>>> = LazyLock::new(|| {
    log::trace!("Initializing queue service slot");
    RwLock::new(None)
});

/// Install `service` as the process-wide instance, returning the one it
/// replaced
pub async fn install_queue_service(service: Arc<QueueService>) -> Option<Arc<QueueService>> {
    log::trace!("Installing queue service");
    QUEUE_SERVICE.write().await.replace(service)
}

/// Access the process-wide service, if one has been installed
///
/// # Examples
/// ```no_run
/// # use queuegate::service::api::get_queue_service;
/// # async fn example() {
/// if let Some(service) = get_queue_service().await {
///     let queues = service.lookup_queue("", "").await;
/// }
/// # }
/// ```
pub async fn get_queue_service() -> Option<Arc<QueueService>> {
    QUEUE_SERVICE.read().await.clone()
}

/// Remove the process-wide service and close its consumer sessions
pub async fn uninstall_queue_service() -> Option<Arc<QueueService>> {
    let removed = QUEUE_SERVICE.write().await.take();
    if let Some(service) = &removed {
        service.shutdown().await;
    }
    removed
}
