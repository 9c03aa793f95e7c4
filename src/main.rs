//! Storey demo
//!
//! Runs a short workload against an in-memory host store and logs how the
//! cache evicts to stay within capacity.

use anyhow::Context;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storey::{Config, MemoryStore, Storage};

/// Entries written by the demo; enough to overflow capacity.
const DEMO_ENTRIES: usize = 12;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storey=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Storey demo");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={} bytes, host_quota={:?}",
        config.capacity, config.host_quota
    );

    let backend = match config.host_quota {
        Some(quota) => MemoryStore::with_quota(quota),
        None => MemoryStore::new(),
    };
    let storage = Storage::from_config(backend, &config);

    let payload = "x".repeat((config.capacity / 8).max(1));
    for i in 0..DEMO_ENTRIES {
        let key = format!("asset-{}", i);
        storage
            .set(key.as_str(), &payload)
            .await
            .with_context(|| format!("failed to cache {}", key))?;
    }

    let oldest = storage.get::<Value>("asset-0").await?;
    info!("asset-0 after overflow: {}", if oldest.is_some() { "hit" } else { "miss" });

    let newest = format!("asset-{}", DEMO_ENTRIES - 1);
    let latest = storage.get::<Value>(newest.as_str()).await?;
    info!("{} after overflow: {}", newest, if latest.is_some() { "hit" } else { "miss" });

    let stats = storage.stats();
    info!(
        "size={} left={} entries={} evictions={} hit_rate={:.2}",
        storage.size()?,
        storage.left()?,
        stats.total_entries,
        stats.evictions,
        stats.hit_rate()
    );

    Ok(())
}
