//! Service settings and response shapes

use crate::backend::GroupRecord;
use serde::{Deserialize, Serialize};

/// Provisioning and connection settings the service needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Broker addresses handed to the transport when opening consumer sessions
    pub broker_addrs: Vec<String>,
    /// Registry address used for topic creation and deletion
    pub registry_addr: String,
    /// Partition count for new topics
    pub partitions: u32,
    /// Replication factor for new topics
    pub replications: u32,
}

/// Permissions and callback settings of a group on a queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAcl {
    pub write: bool,
    pub read: bool,
    pub url: String,
    pub ips: Vec<String>,
}

/// A group configuration as returned to callers.
///
/// The name that is already the lookup context is left out: queue lookups
/// carry `group`, group lookups carry `queue`, and single-group reads carry
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    pub write: bool,
    pub read: bool,
    pub url: String,
    pub ips: Vec<String>,
}

impl GroupConfig {
    /// Shape for a queue lookup: carries the group name
    pub(crate) fn for_queue_lookup(record: GroupRecord) -> Self {
        Self {
            group: Some(record.group),
            queue: None,
            write: record.write,
            read: record.read,
            url: record.url,
            ips: record.ips,
        }
    }

    /// Shape for a group lookup: carries the queue name
    pub(crate) fn for_group_lookup(record: GroupRecord) -> Self {
        Self {
            group: None,
            queue: Some(record.queue),
            write: record.write,
            read: record.read,
            url: record.url,
            ips: record.ips,
        }
    }

    /// Full record with both names
    pub(crate) fn full(record: GroupRecord) -> Self {
        Self {
            group: Some(record.group),
            queue: Some(record.queue),
            write: record.write,
            read: record.read,
            url: record.url,
            ips: record.ips,
        }
    }
}

/// A queue with its groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub queue: String,
    /// Creation time from the metadata store, Unix seconds
    pub ctime: i64,
    /// Depth is not computed here and always reads 0
    pub length: u64,
    pub groups: Vec<GroupConfig>,
}

/// A group with the queues it is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group: String,
    pub queues: Vec<GroupConfig>,
}

/// Which store holds a queue that the other does not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inconsistency {
    /// Known to the metadata store, no broker topic
    MetadataOnly,
    /// Broker topic without a metadata record
    BrokerOnly,
}

/// One queue found in only one of the two stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueAudit {
    pub queue: String,
    pub state: Inconsistency,
}
