#![deny(clippy::all)]

use crate::domain::RegionConfig;
use async_trait::async_trait;
use shared::Result;
use std::sync::Arc;

// Ports are the pluggable extension points for the backing store

/// Port for materializing regions in a backing store
#[async_trait]
pub trait RegionDriver: Send + Sync + 'static {
    /// Create a live region named `name`, applying `config` (TTL, key prefix, serializers)
    async fn create_region(&self, name: &str, config: &RegionConfig)
    -> Result<Arc<dyn RegionStore>>;
}

/// Port for one materialized region: a raw keyspace that expires entries per the region TTL.
/// Keys arrive already prefixed and values already serialized.
#[async_trait]
pub trait RegionStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: String, value: Vec<u8>) -> Result<()>;
    async fn evict(&self, key: &str) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
}
