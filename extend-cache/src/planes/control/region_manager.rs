use crate::domain::{DeclaredCacheOperation, RegionConfig};
use crate::planes::control::operation::RegionProvider;
use crate::planes::data::RegionHandle;
use crate::policy::{PolicyRegistry, PolicySourceScanner, ScanReport};
use crate::ports::RegionDriver;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::Result;
use shared::config::CacheSettings;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Hands out lazily materialized regions whose TTL comes from the declared policies,
/// falling back to the process-wide default configuration.
#[derive(Clone)]
pub struct PolicyAwareCacheManager {
    driver: Arc<dyn RegionDriver>,
    registry: Arc<PolicyRegistry>,
    default_config: RegionConfig,
    // Per-name base configuration used instead of the default
    initial_configs: Arc<HashMap<String, RegionConfig>>,
    // Maps region name -> materialized region
    regions: Arc<DashMap<String, Arc<RegionHandle>>>,
    // One creation lock per region name, so unrelated regions never wait on each other
    creation_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Debug for PolicyAwareCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyAwareCacheManager")
            .field("default_config", &self.default_config)
            .field("registry", &self.registry)
            .field("regions", &self.region_names())
            .finish()
    }
}

impl PolicyAwareCacheManager {
    pub fn new(
        driver: Arc<dyn RegionDriver>,
        registry: Arc<PolicyRegistry>,
        default_config: RegionConfig,
    ) -> Self {
        Self {
            driver,
            registry,
            default_config,
            initial_configs: Arc::new(HashMap::new()),
            regions: Arc::new(DashMap::new()),
            creation_locks: Arc::new(DashMap::new()),
        }
    }

    /// Create a manager whose default configuration comes from `settings`
    pub fn from_settings(
        driver: Arc<dyn RegionDriver>,
        registry: Arc<PolicyRegistry>,
        settings: &CacheSettings,
    ) -> Self {
        Self::new(driver, registry, RegionConfig::from_settings(settings))
    }

    /// Use `config` instead of the default as the starting point for region `name`.
    /// The region is still materialized lazily and a declared TTL still overrides it.
    pub fn with_initial_config(mut self, name: impl Into<String>, config: RegionConfig) -> Self {
        Arc::make_mut(&mut self.initial_configs).insert(name.into(), config);
        self
    }

    pub fn registry(&self) -> &Arc<PolicyRegistry> {
        &self.registry
    }

    pub fn default_config(&self) -> &RegionConfig {
        &self.default_config
    }

    /// Populate the policy registry from the host's declared operations.
    /// Call once during startup, before serving cached traffic.
    pub fn initialize<'a, I>(&self, operations: I) -> ScanReport
    where
        I: IntoIterator<Item = &'a DeclaredCacheOperation>,
    {
        PolicySourceScanner::new(self.registry.clone()).scan(operations)
    }

    /// The configuration region `name` would be materialized with right now
    pub fn resolve_config(&self, name: &str) -> RegionConfig {
        let base = self
            .initial_configs
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default_config.clone());

        match self.registry.get(name).and_then(|p| p.ttl_override()) {
            Some(ttl) => base.with_ttl(ttl),
            None => base,
        }
    }

    /// Get the region named `name`, materializing it through the driver on first use.
    /// Concurrent first calls for one name share a single materialization.
    /// A driver failure is returned as-is and leaves no trace, so the next call retries.
    pub async fn get_region(&self, name: &str) -> Result<Arc<RegionHandle>> {
        if let Some(region) = self.region(name) {
            return Ok(region);
        }

        let lock = self
            .creation_locks
            .entry(name.to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have finished while we waited
        let result = match self.region(name) {
            Some(region) => Ok(region),
            None => self.materialize(name).await,
        };

        // Drop the lock entry once nobody else is queued on it
        self.creation_locks
            .remove_if(name, |_, queued| Arc::strong_count(queued) == 2);

        result
    }

    /// Runs with the creation lock for `name` held
    async fn materialize(&self, name: &str) -> Result<Arc<RegionHandle>> {
        let config = self.resolve_config(name);
        debug!(
            "Materializing region '{}' with ttl {}s",
            name,
            config.ttl_seconds()
        );

        let store = self
            .driver
            .create_region(name, &config)
            .await
            .inspect_err(|e| warn!("Failed to materialize region '{}': {}", name, e))?;

        let region = Arc::new(RegionHandle::new(name, config, store));
        self.regions.insert(name.to_string(), region.clone());

        info!(
            "Region '{}' ready (ttl: {}s, prefix: '{}')",
            name,
            region.config().ttl_seconds(),
            region.config().key_prefix.compute(name)
        );

        Ok(region)
    }

    /// Peek at an already materialized region without creating it
    pub fn region(&self, name: &str) -> Option<Arc<RegionHandle>> {
        self.regions.get(name).map(|entry| entry.value().clone())
    }

    pub fn is_materialized(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn region_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.regions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Drop every materialized region; the next access materializes it again.
    /// Waits for materializations already in flight so none of them outlives the reset.
    /// Materializations that begin after the reset started may still land.
    pub async fn reset(&self) {
        let in_flight: Vec<Arc<Mutex<()>>> = self
            .creation_locks
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut guards = Vec::with_capacity(in_flight.len());
        for lock in &in_flight {
            guards.push(lock.lock().await);
        }

        let dropped = self.regions.len();
        self.regions.clear();
        drop(guards);

        info!("Cache manager reset, {} regions dropped", dropped);
    }

    /// Get-or-compute against a named region, materializing the region if needed
    pub async fn get_or_compute<T, F, Fut>(&self, region: &str, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.get_region(region)
            .await?
            .get_or_compute(key, compute)
            .await
    }
}

#[async_trait]
impl RegionProvider for PolicyAwareCacheManager {
    async fn get_region(&self, name: &str) -> Result<Arc<RegionHandle>> {
        PolicyAwareCacheManager::get_region(self, name).await
    }

    async fn evict(&self, region: &str, key: &str) -> Result<bool> {
        match self.region(region) {
            Some(handle) => handle.evict(key).await,
            None => Ok(false),
        }
    }

    async fn clear(&self, region: &str) -> Result<()> {
        match self.region(region) {
            Some(handle) => handle.clear().await,
            None => Ok(()),
        }
    }
}
