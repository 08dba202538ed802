pub mod operation;
pub mod region_manager;

pub use operation::RegionProvider;
pub use region_manager::PolicyAwareCacheManager;
