use crate::domain::RegionConfig;
use crate::ports::{RegionDriver, RegionStore};
use async_trait::async_trait;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// HashMap-backed region store, no expiry
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl RegionStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: String, value: Vec<u8>) -> Result<()> {
        self.entries.lock().unwrap().insert(key, value);
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

/// Driver that records every materialization request and can fail or stall on demand
#[derive(Default)]
pub struct RecordingDriver {
    pub created: Mutex<Vec<(String, RegionConfig)>>,
    pub failures_left: AtomicUsize,
    pub delay: Option<Duration>,
}

impl RecordingDriver {
    pub fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn create_calls(&self, name: &str) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .count()
    }
}

#[async_trait]
impl RegionDriver for RecordingDriver {
    async fn create_region(
        &self,
        name: &str,
        config: &RegionConfig,
    ) -> Result<Arc<dyn RegionStore>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(Error::DriverUnavailable(format!(
                "connection refused while creating '{}'",
                name
            )));
        }
        self.created
            .lock()
            .unwrap()
            .push((name.to_string(), config.clone()));
        Ok(Arc::new(InMemoryStore::default()))
    }
}
