//! Consumer Multiplexer
//!
//! Keeps at most one live consumer session per (queue, group), keyed
//! `queue@group`. A single async mutex guards lookup-or-create; callers
//! receive on the returned session after the lock is released.
//!
//! Sessions are not evicted. They live until [`ConsumerMultiplexer::close_session`]
//! or [`ConsumerMultiplexer::close_all`] is called.

use crate::backend::{BackendError, ConsumerSession, MessageTransport};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cache key of the session for (queue, group)
pub fn session_key(queue: &str, group: &str) -> String {
    format!("{}@{}", queue, group)
}

pub struct ConsumerMultiplexer {
    transport: Arc<dyn MessageTransport>,
    broker_addrs: Vec<String>,
    sessions: Mutex<HashMap<String, Arc<dyn ConsumerSession>>>,
}

impl ConsumerMultiplexer {
    pub fn new(transport: Arc<dyn MessageTransport>, broker_addrs: Vec<String>) -> Self {
        Self {
            transport,
            broker_addrs,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached session for (queue, group), opening it on first use.
    ///
    /// The lock is held while the transport opens a session so concurrent
    /// first callers for the same key share one construction. On failure
    /// nothing is cached.
    pub async fn acquire(
        &self,
        queue: &str,
        group: &str,
    ) -> Result<Arc<dyn ConsumerSession>, BackendError> {
        let key = session_key(queue, group);
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(&key) {
            return Ok(Arc::clone(session));
        }

        let session = self
            .transport
            .open_consumer_session(&self.broker_addrs, queue, group)
            .await?;
        sessions.insert(key.clone(), Arc::clone(&session));
        log::debug!("cached consumer session {} ({} live)", key, sessions.len());
        Ok(session)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop and close the session for (queue, group). Returns whether one
    /// existed.
    pub async fn close_session(&self, queue: &str, group: &str) -> Result<bool, BackendError> {
        let key = session_key(queue, group);
        let removed = self.sessions.lock().await.remove(&key);
        match removed {
            Some(session) => {
                session.close().await?;
                log::debug!("closed consumer session {}", key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Close every cached session. Individual close failures are logged and
    /// the remaining sessions are still closed. Returns the number closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<(String, Arc<dyn ConsumerSession>)> =
            self.sessions.lock().await.drain().collect();

        let results = futures::future::join_all(
            drained
                .iter()
                .map(|(key, session)| async move { (key, session.close().await) }),
        )
        .await;

        let mut closed = 0;
        for (key, result) in results {
            match result {
                Ok(()) => closed += 1,
                Err(e) => log::warn!("failed to close consumer session {}: {}", key, e),
            }
        }
        if closed > 0 {
            log::debug!("closed {} consumer session(s)", closed);
        }
        closed
    }
}
