use std::sync::Arc;

use async_trait::async_trait;

use shared::Result;

use crate::planes::data::RegionHandle;

/// Named-region access for hosts that hold the manager behind a trait object
#[async_trait]
pub trait RegionProvider: Send + Sync + 'static {
    async fn get_region(&self, name: &str) -> Result<Arc<RegionHandle>>;

    /// Evict `key` from `region`; a region that was never materialized holds nothing
    async fn evict(&self, region: &str, key: &str) -> Result<bool>;

    async fn clear(&self, region: &str) -> Result<()>;
}
