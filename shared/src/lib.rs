// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("conflicting policies declared for region '{region}'")]
    PolicyConflict { region: String },
    #[error("driver unavailable: {0}")]
    DriverUnavailable(String),
    #[error("invalid cache policy on '{operation}': {reason}")]
    InvalidPolicy { operation: String, reason: String },
    #[error("no cache policy declared on '{0}'")]
    MissingPolicy(String),
    #[error("invalid region config: {0}")]
    InvalidConfig(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("compute: {0}")]
    Compute(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_policy(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPolicy {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Declared time-to-live in seconds. `-1` means "no override".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TtlSecs(pub i64);

impl TtlSecs {
    pub const NO_OVERRIDE: TtlSecs = TtlSecs(-1);
    /// Longest TTL any region may carry: 100 years
    pub const MAX_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

    pub fn is_override(&self) -> bool {
        self.0 != Self::NO_OVERRIDE.0
    }
}

impl Default for TtlSecs {
    fn default() -> Self {
        Self::NO_OVERRIDE
    }
}

pub mod config;
