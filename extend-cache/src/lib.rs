pub mod domain;
pub mod planes;
pub mod policy;
pub mod ports;

pub use domain::{
    CachePolicy, CacheableDeclaration, DeclaredCacheOperation, KeyPrefix, OperationDefaults,
    RegionConfig,
};
pub use planes::control::{PolicyAwareCacheManager, RegionProvider};
pub use planes::data::RegionHandle;
pub use policy::{PolicyRegistry, PolicySourceScanner, ScanReport};
pub use ports::{RegionDriver, RegionStore};

#[cfg(test)]
pub(crate) mod test_support;
