use crate::TtlSecs;
use std::time::Duration;
use tracing::warn;

/// How region keys are written to the backing store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeySerialization {
    #[default]
    String,
}

/// How region values are written to the backing store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueSerialization {
    #[default]
    Json,
}

impl TryFrom<&str> for ValueSerialization {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ValueSerialization::Json),
            _ => Err("Invalid value serialization"),
        }
    }
}

/// Process-wide cache defaults, applied to every region that does not declare its own policy
#[derive(Clone, Debug)]
pub struct CacheSettings {
    pub default_ttl_seconds: u64,
    pub key_prefix: String,
    pub key_serialization: KeySerialization,
    pub value_serialization: ValueSerialization,
    pub max_entries: Option<u64>,
}

impl CacheSettings {
    pub const DEFAULT_TTL_SECONDS: u64 = 24 * 60 * 60;
    pub const DEFAULT_KEY_PREFIX: &'static str = "extend";

    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source; `from_env` uses the process environment
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_ttl_seconds = match var("EXTEND_CACHE_TTL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs <= TtlSecs::MAX_SECONDS => secs,
                Ok(secs) => {
                    warn!(
                        "EXTEND_CACHE_TTL_SECS={} exceeds the maximum of {}s, using {}",
                        secs,
                        TtlSecs::MAX_SECONDS,
                        Self::DEFAULT_TTL_SECONDS
                    );
                    Self::DEFAULT_TTL_SECONDS
                }
                Err(_) => {
                    warn!(
                        "EXTEND_CACHE_TTL_SECS='{}' is not a valid number of seconds, using {}",
                        raw,
                        Self::DEFAULT_TTL_SECONDS
                    );
                    Self::DEFAULT_TTL_SECONDS
                }
            },
            None => Self::DEFAULT_TTL_SECONDS,
        };

        let key_prefix = var("EXTEND_CACHE_KEY_PREFIX")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_KEY_PREFIX.to_string());

        let value_serialization = match var("EXTEND_CACHE_VALUE_SERIALIZATION") {
            Some(raw) => ValueSerialization::try_from(raw.as_str()).unwrap_or_else(|e| {
                warn!("{}: '{}', falling back to json", e, raw);
                ValueSerialization::Json
            }),
            None => ValueSerialization::Json,
        };

        let max_entries = var("EXTEND_CACHE_MAX_ENTRIES").and_then(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| warn!("EXTEND_CACHE_MAX_ENTRIES='{}' ignored", raw))
                .ok()
        });

        Self {
            default_ttl_seconds,
            key_prefix,
            key_serialization: KeySerialization::String,
            value_serialization,
            max_entries,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
