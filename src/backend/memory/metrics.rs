//! In-process metrics recorder

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::traits::MetricsRecorder;
use crate::backend::types::{Direction, MetricsBucket, MetricsSeries};
use crate::core::sync::handle_mutex_poison;
use crate::core::time::{SystemTimeProvider, TimeProvider};
use crate::core::validation::MAX_METRICS_BUCKETS;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// `count` events observed at Unix second `at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedEvent {
    pub at: i64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupCounters {
    #[serde(default)]
    pub send: Vec<CountedEvent>,
    #[serde(default)]
    pub receive: Vec<CountedEvent>,
}

impl GroupCounters {
    fn events(&self, direction: Direction) -> &[CountedEvent] {
        match direction {
            Direction::Send => &self.send,
            Direction::Receive => &self.receive,
        }
    }

    fn events_mut(&mut self, direction: Direction) -> &mut Vec<CountedEvent> {
        match direction {
            Direction::Send => &mut self.send,
            Direction::Receive => &mut self.receive,
        }
    }
}

/// Serializable contents of the recorder: queue -> group -> counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsState {
    #[serde(default)]
    pub queues: BTreeMap<String, BTreeMap<String, GroupCounters>>,
}

pub struct MemoryMetrics {
    state: Mutex<MetricsState>,
    clock: Arc<dyn TimeProvider>,
}

impl Default for MemoryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetrics {
    pub fn new() -> Self {
        Self::with_state(MetricsState::default(), Arc::new(SystemTimeProvider))
    }

    pub fn with_state(state: MetricsState, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            state: Mutex::new(state),
            clock,
        }
    }

    pub fn snapshot(&self) -> BackendResult<MetricsState> {
        Ok(handle_mutex_poison(self.state.lock(), BackendError::Internal)?.clone())
    }

    /// Lifetime total for one (queue, group, direction)
    pub fn total(&self, direction: Direction, queue: &str, group: &str) -> BackendResult<u64> {
        let state = handle_mutex_poison(self.state.lock(), BackendError::Internal)?;
        Ok(state
            .queues
            .get(queue)
            .and_then(|groups| groups.get(group))
            .map_or(0, |counters| {
                counters.events(direction).iter().map(|e| e.count).sum()
            }))
    }
}

/// Boundaries of `buckets` equal-width intervals covering `[start, end)`.
/// The last interval absorbs the remainder of the division.
fn bucket_bounds(start: i64, end: i64, buckets: u32) -> Vec<(i64, i64)> {
    let origin = i128::from(start);
    let width = (i128::from(end) - origin) / i128::from(buckets);
    // Every boundary lies within [start, end], so narrowing back is lossless
    let at = |i: u32| (origin + width * i128::from(i)) as i64;
    (0..buckets)
        .map(|i| {
            let hi = if i + 1 == buckets { end } else { at(i + 1) };
            (at(i), hi)
        })
        .collect()
}

#[async_trait]
impl MetricsRecorder for MemoryMetrics {
    async fn record(&self, direction: Direction, queue: &str, group: &str, count: u64) {
        let at = self.clock.unix_seconds();
        match handle_mutex_poison(self.state.lock(), BackendError::Internal) {
            Ok(mut state) => state
                .queues
                .entry(queue.to_string())
                .or_default()
                .entry(group.to_string())
                .or_default()
                .events_mut(direction)
                .push(CountedEvent { at, count }),
            Err(e) => log::warn!(
                "dropped {} metric for {}@{}: {}",
                direction,
                queue,
                group,
                e
            ),
        }
    }

    async fn query(
        &self,
        direction: Direction,
        queue: &str,
        group: &str,
        start: i64,
        end: i64,
        buckets: u32,
    ) -> BackendResult<MetricsSeries> {
        if start >= end || buckets == 0 || buckets > MAX_METRICS_BUCKETS {
            return Err(BackendError::Internal(format!(
                "invalid window [{}, {}) with {} buckets",
                start, end, buckets
            )));
        }

        let state = handle_mutex_poison(self.state.lock(), BackendError::Internal)?;
        let events: Vec<CountedEvent> = state
            .queues
            .get(queue)
            .map(|groups| {
                groups
                    .iter()
                    .filter(|(name, _)| group.is_empty() || name.as_str() == group)
                    .flat_map(|(_, counters)| counters.events(direction).iter().copied())
                    .collect()
            })
            .unwrap_or_default();

        let buckets = bucket_bounds(start, end, buckets)
            .into_iter()
            .map(|(lo, hi)| MetricsBucket {
                start: lo,
                end: hi,
                count: events
                    .iter()
                    .filter(|e| e.at >= lo && e.at < hi)
                    .map(|e| e.count)
                    .sum(),
            })
            .collect();

        Ok(MetricsSeries {
            queue: queue.to_string(),
            group: group.to_string(),
            direction,
            buckets,
        })
    }
}
