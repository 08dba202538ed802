use shared::TtlSecs;
use shared::config::{CacheSettings, KeySerialization, ValueSerialization};
use std::time::Duration;

pub mod declaration {
    use shared::TtlSecs;

    /// Call-site declaration attached to one cache-producing operation
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct CacheableDeclaration {
        pub region_names: Vec<String>,
        pub ttl_seconds: TtlSecs,
        pub key: String,
        pub key_generator: String,
        pub cache_manager: String,
        pub cache_resolver: String,
        pub condition: String,
        pub unless: String,
        pub sync: bool,
    }

    impl CacheableDeclaration {
        pub fn new<I, S>(region_names: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                region_names: region_names.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }

        pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
            self.ttl_seconds = TtlSecs(ttl_seconds);
            self
        }

        pub fn with_key(mut self, key: impl Into<String>) -> Self {
            self.key = key.into();
            self
        }

        pub fn with_key_generator(mut self, key_generator: impl Into<String>) -> Self {
            self.key_generator = key_generator.into();
            self
        }

        pub fn with_cache_manager(mut self, cache_manager: impl Into<String>) -> Self {
            self.cache_manager = cache_manager.into();
            self
        }

        pub fn with_cache_resolver(mut self, cache_resolver: impl Into<String>) -> Self {
            self.cache_resolver = cache_resolver.into();
            self
        }

        pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
            self.condition = condition.into();
            self
        }

        pub fn with_unless(mut self, unless: impl Into<String>) -> Self {
            self.unless = unless.into();
            self
        }

        pub fn with_sync(mut self, sync: bool) -> Self {
            self.sync = sync;
            self
        }
    }

    /// Defaults shared by a group of operations, e.g. every cached method of one service
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct OperationDefaults {
        pub region_names: Vec<String>,
        pub key_generator: String,
        pub cache_manager: String,
        pub cache_resolver: String,
    }

    impl OperationDefaults {
        pub fn new<I, S>(region_names: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                region_names: region_names.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }

        pub fn with_key_generator(mut self, key_generator: impl Into<String>) -> Self {
            self.key_generator = key_generator.into();
            self
        }

        pub fn with_cache_manager(mut self, cache_manager: impl Into<String>) -> Self {
            self.cache_manager = cache_manager.into();
            self
        }

        pub fn with_cache_resolver(mut self, cache_resolver: impl Into<String>) -> Self {
            self.cache_resolver = cache_resolver.into();
            self
        }

        /// Fill the blanks of `declaration` from these defaults.
        /// Explicit values on the declaration always win.
        pub fn apply(&self, declaration: &mut CacheableDeclaration) {
            if declaration.region_names.is_empty() && !self.region_names.is_empty() {
                declaration.region_names = self.region_names.clone();
            }

            if declaration.key.is_empty()
                && declaration.key_generator.is_empty()
                && !self.key_generator.is_empty()
            {
                declaration.key_generator = self.key_generator.clone();
            }

            // An explicit manager or resolver means nothing is inherited
            if !declaration.cache_manager.is_empty() || !declaration.cache_resolver.is_empty() {
                return;
            }
            if !self.cache_resolver.is_empty() {
                declaration.cache_resolver = self.cache_resolver.clone();
            } else if !self.cache_manager.is_empty() {
                declaration.cache_manager = self.cache_manager.clone();
            }
        }
    }

    /// An operation discovered by the host at startup, as handed to the scanner
    #[derive(Clone, Debug)]
    pub struct DeclaredCacheOperation {
        pub name: String,
        pub declaration: Option<CacheableDeclaration>,
        pub defaults: Option<OperationDefaults>,
    }

    impl DeclaredCacheOperation {
        pub fn new(name: impl Into<String>, declaration: CacheableDeclaration) -> Self {
            Self {
                name: name.into(),
                declaration: Some(declaration),
                defaults: None,
            }
        }

        /// An operation that was discovered but carries no cache declaration
        pub fn undeclared(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                declaration: None,
                defaults: None,
            }
        }

        pub fn with_defaults(mut self, defaults: OperationDefaults) -> Self {
            self.defaults = Some(defaults);
            self
        }
    }
}

pub use declaration::{CacheableDeclaration, DeclaredCacheOperation, OperationDefaults};

/// Per-region policy, one entry in the policy registry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    pub region_name: String,
    pub ttl_seconds: TtlSecs,
    pub key_expr: String,
    pub key_generator: String,
    pub condition: String,
    pub unless: String,
    pub sync: bool,
}

impl CachePolicy {
    pub fn from_declaration(region_name: impl Into<String>, decl: &CacheableDeclaration) -> Self {
        Self {
            region_name: region_name.into(),
            ttl_seconds: decl.ttl_seconds,
            key_expr: decl.key.clone(),
            key_generator: decl.key_generator.clone(),
            condition: decl.condition.clone(),
            unless: decl.unless.clone(),
            sync: decl.sync,
        }
    }

    /// The TTL this policy imposes on its region, `None` when it defers to the default
    pub fn ttl_override(&self) -> Option<Duration> {
        if self.ttl_seconds.is_override() {
            Some(Duration::from_secs(self.ttl_seconds.0.max(0) as u64))
        } else {
            None
        }
    }
}

/// Prefix rule for stored keys: `{prefix}::{region}::{key}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPrefix {
    prefix: String,
}

impl KeyPrefix {
    pub const SEPARATOR: &'static str = "::";

    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = if prefix.trim().is_empty() {
            CacheSettings::DEFAULT_KEY_PREFIX.to_string()
        } else {
            prefix
        };
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key prefix for every entry of `region`
    pub fn compute(&self, region: &str) -> String {
        format!("{}{sep}{}{sep}", self.prefix, region, sep = Self::SEPARATOR)
    }

    pub fn full_key(&self, region: &str, key: &str) -> String {
        let mut full = self.compute(region);
        full.push_str(key);
        full
    }
}

impl Default for KeyPrefix {
    fn default() -> Self {
        Self::new(CacheSettings::DEFAULT_KEY_PREFIX)
    }
}

/// Effective configuration a region is materialized with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionConfig {
    pub ttl: Duration, // ZERO = entries never expire
    pub key_prefix: KeyPrefix,
    pub key_serialization: KeySerialization,
    pub value_serialization: ValueSerialization,
}

impl RegionConfig {
    pub fn new(ttl: Duration, key_prefix: KeyPrefix) -> Self {
        Self {
            ttl,
            key_prefix,
            key_serialization: KeySerialization::default(),
            value_serialization: ValueSerialization::default(),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            ttl: settings.default_ttl(),
            key_prefix: KeyPrefix::new(settings.key_prefix.clone()),
            key_serialization: settings.key_serialization,
            value_serialization: settings.value_serialization,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.as_secs()
    }

    pub fn expires(&self) -> bool {
        !self.ttl.is_zero()
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}
