//! Group ACL Manager
//!
//! Manages the per-(group, queue) access records held in the metadata store.
//! Writes require the queue's broker topic to exist on a refreshed view.

use crate::backend::{BrokerRegistry, GroupRecord, MetadataStore};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::existence::{require_topic, ExistenceCheck};
use crate::service::require_name;
use crate::service::types::{GroupAcl, GroupConfig, GroupInfo};
use std::sync::Arc;

pub struct GroupAclManager {
    registry: Arc<dyn BrokerRegistry>,
    metadata: Arc<dyn MetadataStore>,
}

impl GroupAclManager {
    pub fn new(registry: Arc<dyn BrokerRegistry>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { registry, metadata }
    }

    pub async fn add_group(&self, group: &str, queue: &str, acl: GroupAcl) -> ServiceResult<()> {
        const OP: &str = "AddGroup";
        let record = self.checked_record(OP, group, queue, acl).await?;
        self.metadata
            .add_group_config(&record)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        log::info!(
            "added group '{}' to queue '{}' (write={}, read={})",
            group,
            queue,
            record.write,
            record.read
        );
        Ok(())
    }

    pub async fn update_group(&self, group: &str, queue: &str, acl: GroupAcl) -> ServiceResult<()> {
        const OP: &str = "UpdateGroup";
        let record = self.checked_record(OP, group, queue, acl).await?;
        self.metadata
            .update_group_config(&record)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        log::info!(
            "updated group '{}' on queue '{}' (write={}, read={})",
            group,
            queue,
            record.write,
            record.read
        );
        Ok(())
    }

    pub async fn delete_group(&self, group: &str, queue: &str) -> ServiceResult<()> {
        const OP: &str = "DeleteGroup";
        require_name("Group", group)?;
        require_name("Queue", queue)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Strict, OP, queue).await?;

        self.metadata
            .delete_group_config(group, queue)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        log::info!("deleted group '{}' from queue '{}'", group, queue);
        Ok(())
    }

    /// Every group with the queues it is attached to, or just `group` when
    /// it is non-empty. An unknown group yields an empty list.
    pub async fn lookup_group(&self, group: &str) -> ServiceResult<Vec<GroupInfo>> {
        const OP: &str = "LookupGroup";
        log::debug!("lookup group='{}'", group);

        let group_map = self
            .metadata
            .get_group_map()
            .await
            .map_err(ServiceError::upstream(OP, "*", None))?;

        let mut infos = Vec::new();
        for (group_name, queue_names) in &group_map {
            if !group.is_empty() && group_name != group {
                continue;
            }
            let mut queues = Vec::with_capacity(queue_names.len());
            for queue in queue_names {
                match self
                    .metadata
                    .get_group_config(group_name, queue)
                    .await
                    .map_err(ServiceError::upstream(OP, queue, Some(group_name.as_str())))?
                {
                    Some(record) => queues.push(GroupConfig::for_group_lookup(record)),
                    None => log::warn!(
                        "config is missing for group '{}', queue '{}'",
                        group_name,
                        queue
                    ),
                }
            }
            infos.push(GroupInfo {
                group: group_name.clone(),
                queues,
            });
        }
        Ok(infos)
    }

    /// The record for exactly (group, queue), `None` if there is none
    pub async fn get_single_group(
        &self,
        group: &str,
        queue: &str,
    ) -> ServiceResult<Option<GroupConfig>> {
        const OP: &str = "GetSingleGroup";
        require_name("Group", group)?;
        require_name("Queue", queue)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Strict, OP, queue).await?;

        let record = self
            .metadata
            .get_group_config(group, queue)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?;
        log::debug!(
            "group '{}' @ queue '{}': {}",
            group,
            queue,
            if record.is_some() { "found" } else { "absent" }
        );
        Ok(record.map(GroupConfig::full))
    }

    async fn checked_record(
        &self,
        operation: &'static str,
        group: &str,
        queue: &str,
        acl: GroupAcl,
    ) -> ServiceResult<GroupRecord> {
        require_name("Group", group)?;
        require_name("Queue", queue)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Strict, operation, queue).await?;
        Ok(GroupRecord {
            group: group.to_string(),
            queue: queue.to_string(),
            write: acl.write,
            read: acl.read,
            url: acl.url,
            ips: acl.ips,
        })
    }
}
