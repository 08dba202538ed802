use async_trait::async_trait;
use extend_cache::domain::RegionConfig;
use extend_cache::ports::{RegionDriver, RegionStore};
use moka::future::Cache;
use shared::{Error, Result, TtlSecs};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Moka-backed region: one in-process cache per region, TTL fixed at creation time
pub struct MokaRegion {
    cache: Cache<String, Vec<u8>>,
}

impl MokaRegion {
    /// Create a region cache from its resolved configuration.
    /// A zero TTL leaves entries without expiry; a TTL above `TtlSecs::MAX_SECONDS` is rejected.
    pub fn new(name: &str, config: &RegionConfig, max_entries: Option<u64>) -> Result<Self> {
        if config.ttl > Duration::from_secs(TtlSecs::MAX_SECONDS) {
            return Err(Error::InvalidConfig(format!(
                "ttl of {}s for region '{}' exceeds the maximum of {}s",
                config.ttl_seconds(),
                name,
                TtlSecs::MAX_SECONDS
            )));
        }

        let mut builder = Cache::builder().name(name);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        if config.expires() {
            builder = builder.time_to_live(config.ttl);
        }

        Ok(Self {
            cache: builder.build(),
        })
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl RegionStore for MokaRegion {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // None covers both missing and expired entries
        Ok(self.cache.get(key).await)
    }

    async fn put(&self, key: String, value: Vec<u8>) -> Result<()> {
        self.cache.insert(key, value).await;
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

impl Debug for MokaRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaRegion")
            .field("name", &self.cache.name())
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

/// Driver materializing regions as Moka caches
#[derive(Clone, Debug, Default)]
pub struct MokaRegionDriver {
    max_entries: Option<u64>,
}

impl MokaRegionDriver {
    /// Unbounded regions
    pub fn new() -> Self {
        Self::default()
    }

    /// Every region holds at most `max_entries` entries
    pub fn bounded(max_entries: u64) -> Self {
        Self {
            max_entries: Some(max_entries),
        }
    }

    pub fn with_max_entries(max_entries: Option<u64>) -> Self {
        Self { max_entries }
    }
}

#[async_trait]
impl RegionDriver for MokaRegionDriver {
    async fn create_region(
        &self,
        name: &str,
        config: &RegionConfig,
    ) -> Result<Arc<dyn RegionStore>> {
        tracing::debug!(
            "Creating moka region '{}' (ttl: {}s, max_entries: {:?})",
            name,
            config.ttl_seconds(),
            self.max_entries
        );
        let region = MokaRegion::new(name, config, self.max_entries)?;
        Ok(Arc::new(region))
    }
}
