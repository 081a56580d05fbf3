//! Message Gateway
//!
//! Send and receive on behalf of a (queue, group). Both paths use the lenient
//! existence check so a hot path does not refresh the registry per message.
//! The group only attributes metrics on send; the transport routes by queue.

use crate::backend::{BrokerRegistry, MessageTransport, MetricsRecorder};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::existence::{require_topic, ExistenceCheck};
use crate::service::require_name;
use crate::service::sessions::ConsumerMultiplexer;
use std::sync::Arc;

pub struct MessageGateway {
    registry: Arc<dyn BrokerRegistry>,
    transport: Arc<dyn MessageTransport>,
    metrics: Arc<dyn MetricsRecorder>,
    sessions: Arc<ConsumerMultiplexer>,
}

impl MessageGateway {
    pub fn new(
        registry: Arc<dyn BrokerRegistry>,
        transport: Arc<dyn MessageTransport>,
        metrics: Arc<dyn MetricsRecorder>,
        sessions: Arc<ConsumerMultiplexer>,
    ) -> Self {
        Self {
            registry,
            transport,
            metrics,
            sessions,
        }
    }

    pub async fn send_message(&self, queue: &str, group: &str, payload: &[u8]) -> ServiceResult<()> {
        const OP: &str = "SendMessage";
        require_name("Queue", queue)?;
        require_name("Group", group)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Lenient, OP, queue).await?;

        self.transport
            .produce(queue, payload)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        self.metrics.record_send(queue, group, 1).await;
        log::debug!("sent {} bytes to {}@{}", payload.len(), queue, group);
        Ok(())
    }

    /// Wait for the next message for `group` on `queue`
    pub async fn receive_message(&self, queue: &str, group: &str) -> ServiceResult<Vec<u8>> {
        const OP: &str = "ReceiveMessage";
        require_name("Queue", queue)?;
        require_name("Group", group)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Lenient, OP, queue).await?;

        let session = self
            .sessions
            .acquire(queue, group)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        let payload = session
            .receive()
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        self.metrics.record_receive(queue, group, 1).await;
        log::debug!("received {} bytes from {}@{}", payload.len(), queue, group);
        Ok(payload)
    }

    /// Acknowledgement is not supported
    pub async fn ack_message(&self, _queue: &str, _group: &str) -> ServiceResult<()> {
        Err(ServiceError::NotImplemented {
            operation: "AckMessage",
        })
    }
}
