// Time-based cache for the loaded measurement set
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: Arc<T>,
    pub loaded_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.loaded_at < ttl
    }
}

/// Holds one value until `ttl` has passed since it was loaded.
///
/// Only successful loads are stored; an error leaves the previous state
/// untouched so the next call retries.
pub struct DatasetCache<T> {
    entry: Mutex<Option<CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T> DatasetCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: Mutex::new(None),
            ttl,
            clock,
        }
    }

    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Held across the load so concurrent callers share one query
        let mut entry = self.entry.lock().await;
        let now = self.clock.now();

        if let Some(cached) = entry.as_ref() {
            if cached.is_fresh(now, self.ttl) {
                tracing::debug!(loaded_at = %cached.loaded_at, "Dataset cache hit");
                return Ok(cached.value.clone());
            }
            tracing::debug!(loaded_at = %cached.loaded_at, "Dataset cache expired");
        }

        let value = Arc::new(load().await?);
        *entry = Some(CacheEntry {
            value: value.clone(),
            loaded_at: now,
        });
        Ok(value)
    }
}
