use crate::domain::CachePolicy;
use dashmap::DashMap;
use std::fmt::Debug;

/// Region name -> policy table, shared between the scanner (writes) and the cache manager (reads).
/// Safe for concurrent readers and writers without external locking.
#[derive(Default)]
pub struct PolicyRegistry {
    policies: DashMap<String, CachePolicy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally store `policy` for `region_name`, returning the policy it replaced
    pub fn put(&self, region_name: impl Into<String>, policy: CachePolicy) -> Option<CachePolicy> {
        self.policies.insert(region_name.into(), policy)
    }

    pub fn get(&self, region_name: &str) -> Option<CachePolicy> {
        self.policies.get(region_name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, region_name: &str) -> bool {
        self.policies.contains_key(region_name)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn region_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.policies.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("regions", &self.region_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CacheableDeclaration;
    use std::sync::Arc;

    fn policy(region: &str, ttl: i64) -> CachePolicy {
        let declaration = CacheableDeclaration::new([region]).with_ttl_seconds(ttl);
        CachePolicy::from_declaration(region, &declaration)
    }

    #[test]
    fn test_get_unknown_region() {
        let registry = PolicyRegistry::new();
        assert!(registry.get("Orders").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let registry = PolicyRegistry::new();
        assert!(registry.put("Shared", policy("Shared", 100)).is_none());

        let replaced = registry.put("Shared", policy("Shared", 300));
        assert_eq!(replaced.map(|p| p.ttl_seconds.0), Some(100));
        assert_eq!(registry.get("Shared").unwrap().ttl_seconds.0, 300);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let registry = Arc::new(PolicyRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let name = format!("region-{}", j % 10);
                        registry.put(name.clone(), policy(&name, i));
                        let _ = registry.get(&name);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 10);
        assert_eq!(registry.region_names()[0], "region-0");
    }
}
