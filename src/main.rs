mod api;
mod catalog;
mod core;
mod polling;
mod pricing;
mod server;

use anyhow::Result;
use std::sync::Arc;

use crate::core::{Config, HealthChecker};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    crate::core::logging::init_logging(&config.server.log_level);

    tracing::info!("🚀 Collectible price tracker starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Sandbox mode: {}", config.ebay.sandbox_mode);

    let health = Arc::new(HealthChecker::new());

    let gateway = Arc::new(api::EbayClient::new(config.ebay.clone()));
    let store = catalog::JsonFileStore::new(&config.storage.data_file);
    let catalog_store = Arc::new(catalog::CatalogStore::new(Box::new(store)));

    // Confirm the snapshot is readable before serving.
    match catalog_store.load().await {
        Ok(snapshot) => {
            health.update_component("catalog_store", true).await;
            tracing::info!("📦 Catalog loaded: {} items tracked", snapshot.items.len());
        }
        Err(e) => {
            health.update_component("catalog_store", false).await;
            tracing::error!("❌ Catalog snapshot unreadable: {}", e);
        }
    }

    let orchestrator = Arc::new(polling::PollingOrchestrator::new(
        gateway,
        catalog_store.clone(),
        config.polling.search_limit,
    ));

    let scheduler = polling::PriceCheckScheduler::new(
        orchestrator.clone(),
        health.clone(),
        config.polling.interval_hours,
    );
    scheduler.start();

    server::run_server(catalog_store, orchestrator, health, config.server.port).await;

    Ok(())
}
