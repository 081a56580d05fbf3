//! Broker-side queue existence checks

use crate::backend::BrokerRegistry;
use crate::service::error::{ServiceError, ServiceResult};

/// How fresh the broker registry answer must be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceCheck {
    /// Refresh the registry first. Lifecycle, group and metrics operations.
    Strict,
    /// Accept the registry's cached view. Per-message send/receive paths.
    Lenient,
}

impl ExistenceCheck {
    fn force_refresh(self) -> bool {
        matches!(self, ExistenceCheck::Strict)
    }
}

/// Ask the registry whether `queue` has a topic
pub(crate) async fn topic_exists(
    registry: &dyn BrokerRegistry,
    check: ExistenceCheck,
    operation: &'static str,
    queue: &str,
) -> ServiceResult<bool> {
    registry
        .exist_topic(queue, check.force_refresh())
        .await
        .map_err(ServiceError::upstream(operation, queue, None))
}

/// Fail `NotFound` unless `queue` has a topic
pub(crate) async fn require_topic(
    registry: &dyn BrokerRegistry,
    check: ExistenceCheck,
    operation: &'static str,
    queue: &str,
) -> ServiceResult<()> {
    if topic_exists(registry, check, operation, queue).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found(operation, queue))
    }
}
