//! Inventory ledger core: an append-only operation log, lazily materialized
//! daily snapshots, and a write-through balance cache for a game economy.

pub mod balance_cache;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod inventory;
pub mod item_key;
pub mod ledger;
pub mod logging;
pub mod snapshot;

pub use config::AppConfig;
pub use error::{LedgerError, LedgerResult};
pub use item_key::ItemKey;
