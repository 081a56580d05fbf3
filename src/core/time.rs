//! Time provider abstraction for testable time-dependent logic

#[cfg(test)]
use std::sync::atomic::{AtomicI64, Ordering};
#[cfg(test)]
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in whole seconds since the Unix epoch
pub trait TimeProvider: Send + Sync {
    fn unix_seconds(&self) -> i64;
}

/// Production time provider using the system clock
#[derive(Debug, Default, Clone)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn unix_seconds(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs() as i64,
            // Clock before the epoch
            Err(before) => -(before.duration().as_secs() as i64),
        }
    }
}

/// Manually advanced clock for deterministic tests
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockTimeProvider {
    now: Arc<AtomicI64>,
}

#[cfg(test)]
impl MockTimeProvider {
    pub fn new(start: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, value: i64) {
        self.now.store(value, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeProvider for MockTimeProvider {
    fn unix_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
