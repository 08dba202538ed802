use extend_cache::{
    CacheableDeclaration, DeclaredCacheOperation, OperationDefaults, PolicyAwareCacheManager,
    PolicyRegistry,
};
use serde::{Deserialize, Serialize};
use shared::config::CacheSettings;
use std::sync::Arc;
use storage_engine::MokaRegionDriver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Example {
    id: u64,
    describe: String,
    example_type_code: String,
}

/// Every cached operation this application exposes, with its call-site policy
fn declared_operations() -> Vec<DeclaredCacheOperation> {
    let customer_defaults =
        OperationDefaults::new(["Customers"]).with_key_generator("customerKeys");

    vec![
        DeclaredCacheOperation::new(
            "ExampleService::add",
            CacheableDeclaration::new(["Example5"])
                .with_key("#id")
                .with_unless("#result == null")
                .with_ttl_seconds(200),
        ),
        DeclaredCacheOperation::new(
            "CustomerService::find",
            CacheableDeclaration::default().with_ttl_seconds(600),
        )
        .with_defaults(customer_defaults),
        DeclaredCacheOperation::new(
            "CatalogService::countries",
            CacheableDeclaration::new(["Countries"]).with_ttl_seconds(0),
        ),
        DeclaredCacheOperation::undeclared("HealthService::ping"),
    ]
}

async fn add_example(manager: &PolicyAwareCacheManager, id: u64) -> shared::Result<Example> {
    manager
        .get_or_compute("Example5", &id.to_string(), || async move {
            info!("Computing example {}", id);
            Ok(Example {
                id,
                describe: format!("example-{id}"),
                example_type_code: "code".to_string(),
            })
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting extend-cache demo");

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let settings = CacheSettings::from_env();
    info!(
        "Default region ttl: {}s, key prefix: '{}'",
        settings.default_ttl_seconds, settings.key_prefix
    );

    let manager = PolicyAwareCacheManager::from_settings(
        Arc::new(MokaRegionDriver::with_max_entries(settings.max_entries)),
        Arc::new(PolicyRegistry::new()),
        &settings,
    );

    let report = manager.initialize(&declared_operations());
    for skipped in &report.skipped {
        warn!("Operation '{}' not cached: {}", skipped.operation, skipped.error);
    }

    let first = add_example(&manager, 1).await?;
    let again = add_example(&manager, 1).await?;
    info!(
        "Example {}: '{}' ({}), cached copy matches: {}",
        first.id,
        first.describe,
        first.example_type_code,
        first.describe == again.describe
    );

    for name in ["Example5", "Customers", "Countries", "Sessions"] {
        let region = manager.get_region(name).await?;
        info!(
            "Region '{}' ttl: {}s{}",
            region.name(),
            region.ttl().as_secs(),
            if region.config().expires() { "" } else { " (no expiry)" }
        );
    }

    Ok(())
}
