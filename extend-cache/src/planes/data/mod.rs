pub mod region;

pub use region::RegionHandle;
