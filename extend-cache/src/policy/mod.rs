pub mod registry;
pub mod scanner;

pub use registry::PolicyRegistry;
pub use scanner::{PolicySourceScanner, ScanReport, SkippedOperation};
