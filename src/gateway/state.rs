//! Shared application state handed to every handler (spec.md §1, "thin
//! adapters"). Mirrors the teacher's `AppState` — a small `Clone` struct of
//! `Arc`-wrapped subsystems behind `State<Arc<AppState>>`.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::Catalog;
use crate::engine::BalanceEngine;
use crate::inventory::InventoryApi;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Arc<Catalog>,
    pub engine: Arc<BalanceEngine>,
    pub inventory: Arc<InventoryApi>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        catalog: Arc<Catalog>,
        engine: Arc<BalanceEngine>,
        inventory: Arc<InventoryApi>,
    ) -> Self {
        Self {
            pool,
            catalog,
            engine,
            inventory,
        }
    }
}
