use crate::domain::{CachePolicy, CacheableDeclaration, DeclaredCacheOperation};
use crate::policy::PolicyRegistry;
use shared::{Error, Result, TtlSecs};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An operation the scanner left out of the registry, and why
#[derive(Debug)]
pub struct SkippedOperation {
    pub operation: String,
    pub error: Error,
}

/// Outcome of one scan pass
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Number of (region, policy) pairs written
    pub registered: usize,
    pub skipped: Vec<SkippedOperation>,
    /// Regions whose existing policy was replaced by a different one
    pub conflicts: Vec<String>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.conflicts.is_empty()
    }
}

/// Feeds the policy registry from the operations the host declared at startup
#[derive(Clone, Debug)]
pub struct PolicySourceScanner {
    registry: Arc<PolicyRegistry>,
}

impl PolicySourceScanner {
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self { registry }
    }

    /// Register a policy for every region named by every operation.
    /// Never fails as a whole: a bad operation is skipped and the rest are still scanned.
    pub fn scan<'a, I>(&self, operations: I) -> ScanReport
    where
        I: IntoIterator<Item = &'a DeclaredCacheOperation>,
    {
        let mut report = ScanReport::default();

        for operation in operations {
            match self.scan_operation(operation, &mut report) {
                Ok(registered) => report.registered += registered,
                Err(error) => {
                    match &error {
                        Error::MissingPolicy(_) => debug!("{}", error),
                        _ => warn!("Skipping cache operation: {}", error),
                    }
                    report.skipped.push(SkippedOperation {
                        operation: operation.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Policy scan complete: {} policies registered, {} operations skipped, {} conflicts",
            report.registered,
            report.skipped.len(),
            report.conflicts.len()
        );

        report
    }

    fn scan_operation(
        &self,
        operation: &DeclaredCacheOperation,
        report: &mut ScanReport,
    ) -> Result<usize> {
        let mut declaration = operation
            .declaration
            .clone()
            .ok_or_else(|| Error::MissingPolicy(operation.name.clone()))?;

        if let Some(ref defaults) = operation.defaults {
            defaults.apply(&mut declaration);
        }
        validate(&operation.name, &declaration)?;

        info!(
            "Registering cache policy from '{}', regions: {:?}, ttl_seconds: {}",
            operation.name, declaration.region_names, declaration.ttl_seconds.0
        );

        for region in &declaration.region_names {
            let policy = CachePolicy::from_declaration(region.clone(), &declaration);
            if let Some(previous) = self.registry.put(region.clone(), policy.clone()) {
                if previous != policy {
                    // Last registration wins
                    warn!(
                        "{}: ttl_seconds {} replaced by {} from '{}'",
                        Error::PolicyConflict {
                            region: region.clone()
                        },
                        previous.ttl_seconds.0,
                        policy.ttl_seconds.0,
                        operation.name
                    );
                    report.conflicts.push(region.clone());
                }
            }
        }

        Ok(declaration.region_names.len())
    }
}

/// Reject declarations whose attributes cannot be honored together
fn validate(operation: &str, decl: &CacheableDeclaration) -> Result<()> {
    if decl.region_names.is_empty() {
        return Err(Error::invalid_policy(
            operation,
            "at least one region name must be declared",
        ));
    }
    if decl.region_names.iter().any(|name| name.trim().is_empty()) {
        return Err(Error::invalid_policy(operation, "region names must not be blank"));
    }
    if decl.ttl_seconds.0 < -1 {
        return Err(Error::invalid_policy(
            operation,
            format!(
                "ttl_seconds must be -1 (no override) or non-negative, got {}",
                decl.ttl_seconds.0
            ),
        ));
    }
    if decl.ttl_seconds.0 > TtlSecs::MAX_SECONDS as i64 {
        return Err(Error::invalid_policy(
            operation,
            format!(
                "ttl_seconds must not exceed {}, got {}",
                TtlSecs::MAX_SECONDS,
                decl.ttl_seconds.0
            ),
        ));
    }
    if !decl.key.is_empty() && !decl.key_generator.is_empty() {
        return Err(Error::invalid_policy(
            operation,
            "both 'key' and 'key_generator' are set; they are mutually exclusive",
        ));
    }
    if !decl.cache_manager.is_empty() && !decl.cache_resolver.is_empty() {
        return Err(Error::invalid_policy(
            operation,
            "both 'cache_manager' and 'cache_resolver' are set; they are mutually exclusive",
        ));
    }
    if decl.sync && !decl.unless.is_empty() {
        return Err(Error::invalid_policy(operation, "'unless' is not supported with 'sync'"));
    }
    if decl.sync && decl.region_names.len() > 1 {
        return Err(Error::invalid_policy(
            operation,
            "only one region may be declared with 'sync'",
        ));
    }
    Ok(())
}
