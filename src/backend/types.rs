//! Records exchanged with collaborators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access-control record of one group on one queue, as held by the
/// extended metadata store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub group: String,
    pub queue: String,
    pub write: bool,
    pub read: bool,
    pub url: String,
    pub ips: Vec<String>,
}

/// Direction of a counted message event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Send,
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => write!(f, "send"),
            Direction::Receive => write!(f, "receive"),
        }
    }
}

/// Event count within `[start, end)`, in Unix seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsBucket {
    pub start: i64,
    pub end: i64,
    pub count: u64,
}

/// Chronological buckets answering one metrics query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSeries {
    pub queue: String,
    /// Empty when the series aggregates every group of the queue
    pub group: String,
    pub direction: Direction,
    pub buckets: Vec<MetricsBucket>,
}

impl MetricsSeries {
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }
}
