//! Queue Lifecycle Manager
//!
//! Creates, updates, deletes and looks up queues across the broker registry
//! and the extended metadata store. The two stores are not transactionally
//! linked. Writes go metadata first, then broker, in both directions; a
//! failure of the second step is logged and returned, and the first step is
//! left in place. `audit` reports queues that ended up in only one store.

use crate::backend::{BrokerRegistry, MetadataStore};
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::existence::{require_topic, topic_exists, ExistenceCheck};
use crate::service::require_name;
use crate::service::types::{
    GroupConfig, Inconsistency, QueueAudit, QueueInfo, ServiceSettings,
};
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct QueueLifecycle {
    registry: Arc<dyn BrokerRegistry>,
    metadata: Arc<dyn MetadataStore>,
    settings: Arc<ServiceSettings>,
}

impl QueueLifecycle {
    pub fn new(
        registry: Arc<dyn BrokerRegistry>,
        metadata: Arc<dyn MetadataStore>,
        settings: Arc<ServiceSettings>,
    ) -> Self {
        Self {
            registry,
            metadata,
            settings,
        }
    }

    /// Create `queue` in both stores, metadata record first
    pub async fn create(&self, queue: &str) -> ServiceResult<()> {
        const OP: &str = "CreateQueue";
        require_name("Queue", queue)?;

        if topic_exists(self.registry.as_ref(), ExistenceCheck::Strict, OP, queue).await? {
            return Err(ServiceError::AlreadyExists {
                operation: OP,
                queue: queue.to_string(),
            });
        }
        if self.metadata_has(OP, queue).await? {
            return Err(ServiceError::AlreadyExists {
                operation: OP,
                queue: queue.to_string(),
            });
        }

        self.metadata
            .add_queue(queue)
            .await
            .map_err(ServiceError::upstream(OP, queue, None))?;

        if let Err(e) = self
            .registry
            .create_topic(
                queue,
                self.settings.replications,
                self.settings.partitions,
                &self.settings.registry_addr,
            )
            .await
        {
            log::error!(
                "queue '{}' recorded in metadata but broker topic creation failed: {}",
                queue,
                e
            );
            return Err(ServiceError::upstream(OP, queue, None)(e));
        }

        log::info!(
            "created queue '{}' ({} partitions, {} replicas)",
            queue,
            self.settings.partitions,
            self.settings.replications
        );
        Ok(())
    }

    /// Validate that `queue` exists. No queue attribute is mutable yet.
    pub async fn update(&self, queue: &str) -> ServiceResult<()> {
        const OP: &str = "UpdateQueue";
        require_name("Queue", queue)?;
        require_topic(self.registry.as_ref(), ExistenceCheck::Strict, OP, queue).await
    }

    /// Delete `queue` from both stores, metadata record first
    pub async fn delete(&self, queue: &str) -> ServiceResult<()> {
        const OP: &str = "DeleteQueue";
        require_name("Queue", queue)?;

        require_topic(self.registry.as_ref(), ExistenceCheck::Strict, OP, queue).await?;
        if !self.metadata_has(OP, queue).await? {
            return Err(ServiceError::not_found(OP, queue));
        }

        self.metadata
            .del_queue(queue)
            .await
            .map_err(ServiceError::upstream(OP, queue, None))?;

        if let Err(e) = self
            .registry
            .delete_topic(queue, &self.settings.registry_addr)
            .await
        {
            log::error!(
                "queue '{}' removed from metadata but broker topic deletion failed: {}",
                queue,
                e
            );
            return Err(ServiceError::upstream(OP, queue, None)(e));
        }

        log::info!("deleted queue '{}'", queue);
        Ok(())
    }

    /// Read queue records.
    ///
    /// - `queue` empty: every queue with all its groups (`group` is ignored)
    /// - `queue` set, `group` empty: that queue with all its groups
    /// - both set: that queue with at most the one group
    ///
    /// A queue unknown to the metadata store yields an empty list.
    pub async fn lookup(&self, queue: &str, group: &str) -> ServiceResult<Vec<QueueInfo>> {
        const OP: &str = "LookupQueue";
        log::debug!("lookup queue='{}' group='{}'", queue, group);

        if queue.is_empty() {
            let queue_map = self
                .metadata
                .get_queue_map()
                .await
                .map_err(ServiceError::upstream(OP, "*", None))?;
            let mut infos = Vec::with_capacity(queue_map.len());
            for (queue_name, group_names) in &queue_map {
                let groups = self.group_configs(OP, queue_name, group_names).await?;
                infos.push(self.queue_info(OP, queue_name, groups).await?);
            }
            return Ok(infos);
        }

        if group.is_empty() {
            let queue_map = self
                .metadata
                .get_queue_map()
                .await
                .map_err(ServiceError::upstream(OP, queue, None))?;
            let Some(group_names) = queue_map.get(queue) else {
                return Ok(Vec::new());
            };
            let groups = self.group_configs(OP, queue, group_names).await?;
            return Ok(vec![self.queue_info(OP, queue, groups).await?]);
        }

        if !self.metadata_has(OP, queue).await? {
            return Ok(Vec::new());
        }
        let groups = self
            .metadata
            .get_group_config(group, queue)
            .await
            .map_err(ServiceError::upstream(OP, queue, Some(group)))?
            .map(GroupConfig::for_queue_lookup)
            .into_iter()
            .collect();
        Ok(vec![self.queue_info(OP, queue, groups).await?])
    }

    /// Queues present in exactly one of the two stores. Read-only.
    pub async fn audit(&self) -> ServiceResult<Vec<QueueAudit>> {
        const OP: &str = "AuditQueues";

        let topics: BTreeSet<String> = self
            .registry
            .list_topics(true)
            .await
            .map_err(ServiceError::upstream(OP, "*", None))?
            .into_iter()
            .collect();
        let recorded: BTreeSet<String> = self
            .metadata
            .get_queue_map()
            .await
            .map_err(ServiceError::upstream(OP, "*", None))?
            .into_keys()
            .collect();

        let mut findings: Vec<QueueAudit> = recorded
            .difference(&topics)
            .map(|queue| QueueAudit {
                queue: queue.clone(),
                state: Inconsistency::MetadataOnly,
            })
            .chain(topics.difference(&recorded).map(|queue| QueueAudit {
                queue: queue.clone(),
                state: Inconsistency::BrokerOnly,
            }))
            .collect();
        findings.sort_by(|a, b| a.queue.cmp(&b.queue));

        for finding in &findings {
            log::warn!("queue '{}' is inconsistent: {:?}", finding.queue, finding.state);
        }
        Ok(findings)
    }

    async fn metadata_has(&self, operation: &'static str, queue: &str) -> ServiceResult<bool> {
        self.metadata
            .exist_queue(queue)
            .await
            .map_err(ServiceError::upstream(operation, queue, None))
    }

    async fn group_configs(
        &self,
        operation: &'static str,
        queue: &str,
        group_names: &[String],
    ) -> ServiceResult<Vec<GroupConfig>> {
        let mut configs = Vec::with_capacity(group_names.len());
        for group in group_names {
            match self
                .metadata
                .get_group_config(group, queue)
                .await
                .map_err(ServiceError::upstream(operation, queue, Some(group.as_str())))?
            {
                Some(record) => configs.push(GroupConfig::for_queue_lookup(record)),
                None => log::warn!("config is missing for queue '{}', group '{}'", queue, group),
            }
        }
        Ok(configs)
    }

    async fn queue_info(
        &self,
        operation: &'static str,
        queue: &str,
        groups: Vec<GroupConfig>,
    ) -> ServiceResult<QueueInfo> {
        let ctime = self
            .metadata
            .queue_create_time(queue)
            .await
            .map_err(ServiceError::upstream(operation, queue, None))?;
        Ok(QueueInfo {
            queue: queue.to_string(),
            ctime,
            length: 0,
            groups,
        })
    }
}
