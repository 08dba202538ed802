use crate::domain::RegionConfig;
use crate::ports::RegionStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::ValueSerialization;
use shared::{Error, Result};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A live, driver-backed cache region with the configuration it was materialized with
pub struct RegionHandle {
    name: String,
    config: RegionConfig,
    store: Arc<dyn RegionStore>,
}

impl RegionHandle {
    pub fn new(name: impl Into<String>, config: RegionConfig, store: Arc<dyn RegionStore>) -> Self {
        Self {
            name: name.into(),
            config,
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Effective entry TTL; `Duration::ZERO` means entries never expire
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    fn full_key(&self, key: &str) -> String {
        self.config.key_prefix.full_key(&self.name, key)
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        match self.config.value_serialization {
            ValueSerialization::Json => {
                serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self.config.value_serialization {
            ValueSerialization::Json => {
                serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(&self.full_key(key)).await? {
            Some(bytes) => self.decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = self.encode(value)?;
        self.store.put(self.full_key(key), bytes).await
    }

    pub async fn evict(&self, key: &str) -> Result<bool> {
        self.store.evict(&self.full_key(key)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Return the cached value for `key`, or run `compute`, store its result and return it.
    /// A failing `compute` is surfaced unchanged and nothing is stored.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get::<T>(key).await? {
            tracing::debug!("Cache hit for key '{}' in region '{}'", key, self.name);
            return Ok(hit);
        }

        tracing::debug!("Cache miss for key '{}' in region '{}'", key, self.name);
        let value = compute().await?;
        self.put(key, &value).await?;
        Ok(value)
    }
}

impl Debug for RegionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionHandle")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("store", &"<dyn RegionStore>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryStore;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: u64,
        describe: String,
    }

    fn region(store: Arc<InMemoryStore>) -> RegionHandle {
        RegionHandle::new("Orders", RegionConfig::default(), store)
    }

    #[tokio::test]
    async fn test_get_or_compute_computes_once() {
        let store = Arc::new(InMemoryStore::default());
        let region = region(store.clone());
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let order = region
                .get_or_compute("42", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Order {
                        id: 42,
                        describe: "code".to_string(),
                    })
                })
                .await
                .unwrap();
            assert_eq!(order.id, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.contains("extend::Orders::42"));
    }

    #[tokio::test]
    async fn test_compute_error_is_not_cached() {
        let store = Arc::new(InMemoryStore::default());
        let region = region(store.clone());

        let result: Result<Order> = region
            .get_or_compute("7", || async { Err(Error::Compute("backend down".into())) })
            .await;
        assert!(matches!(result, Err(Error::Compute(_))));
        assert!(!store.contains("extend::Orders::7"));
    }

    #[tokio::test]
    async fn test_put_get_evict() {
        let region = region(Arc::new(InMemoryStore::default()));
        let order = Order {
            id: 1,
            describe: "first".to_string(),
        };

        region.put("1", &order).await.unwrap();
        assert_eq!(region.get::<Order>("1").await.unwrap(), Some(order));

        assert!(region.evict("1").await.unwrap());
        assert_eq!(region.get::<Order>("1").await.unwrap(), None);
        assert!(!region.evict("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_serialization_error() {
        let region = region(Arc::new(InMemoryStore::default()));
        region.put("1", &"not an order").await.unwrap();

        let result = region.get::<Order>("1").await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
