//! Metrics Integration

use crate::backend::{BrokerRegistry, Direction, MetricsRecorder, MetricsSeries};
use crate::core::validation::validate_window;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::existence::{require_topic, ExistenceCheck};
use crate::service::require_name;
use std::sync::Arc;

pub struct MetricsReader {
    registry: Arc<dyn BrokerRegistry>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl MetricsReader {
    pub fn new(registry: Arc<dyn BrokerRegistry>, metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { registry, metrics }
    }

    /// Send counts for (queue, group) in `buckets` chronological intervals
    /// over `[start, end)`. An empty `group` sums every group.
    pub async fn send_metrics(
        &self,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> ServiceResult<MetricsSeries> {
        self.query("GetSendMetrics", Direction::Send, queue, group, start, end, buckets)
            .await
    }

    /// Receive counts, bucketed like [`MetricsReader::send_metrics`]
    pub async fn receive_metrics(
        &self,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> ServiceResult<MetricsSeries> {
        self.query("GetReceiveMetrics", Direction::Receive, queue, group, start, end, buckets)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn query(
        &self,
        operation: &'static str,
        direction: Direction,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> ServiceResult<MetricsSeries> {
        require_name("Queue", queue)?;
        if !group.is_empty() {
            require_name("Group", group)?;
        }
        validate_window(start, end, buckets).map_err(ServiceError::invalid)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Strict, operation, queue).await?;

        let group_ctx = (!group.is_empty()).then_some(group);
        let series = match direction {
            Direction::Send => self.metrics.query_send(queue, group, start, end, buckets).await,
            Direction::Receive => {
                self.metrics
                    .query_receive(queue, group, start, end, buckets)
                    .await
            }
        }
        .map_err(ServiceError::upstream(operation, queue, group_ctx))?;

        log::debug!(
            "{} {}@{} [{}, {}) -> {} total in {} buckets",
            direction,
            queue,
            group,
            start,
            end,
            series.total(),
            series.buckets.len()
        );
        Ok(series)
    }
}
