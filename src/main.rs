use std::sync::Arc;

use inventory_ledger::balance_cache::BalanceCache;
use inventory_ledger::catalog::Catalog;
use inventory_ledger::engine::BalanceEngine;
use inventory_ledger::gateway::{self, state::AppState};
use inventory_ledger::inventory::InventoryApi;
use inventory_ledger::{AppConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let _guard = logging::init_logging(&config);

    tracing::info!(git_hash = env!("GIT_HASH"), "starting inventory-ledger");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;
    tracing::info!("PostgreSQL connection pool established");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let catalog = Arc::new(Catalog::new(pool.clone(), config.catalog_cache_ttl));
    let balance_cache = BalanceCache::new(config.balance_cache_ttl);
    let engine = Arc::new(BalanceEngine::new(pool.clone(), balance_cache));
    let inventory = Arc::new(InventoryApi::new(
        pool.clone(),
        catalog.clone(),
        engine.clone(),
        config.reserved_section_code.clone(),
    ));

    let state = Arc::new(AppState::new(pool, catalog, engine, inventory));

    gateway::serve(state, config.server_port).await
}
