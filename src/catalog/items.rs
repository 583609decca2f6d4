//! Item reference data (spec.md §3.1 Item): identifier, class, type.
//!
//! Unlike classifiers, items are not cached here — `InventoryApi` only reads
//! one item's class/type per `list` row, and list already makes one
//! `current_balance` round trip per row, so a second uncached lookup doesn't
//! change the request's shape. Read-only, per spec.md §3.3 ("Catalog rows
//! have their own CRUD path, not covered here beyond read semantics").

use sqlx::{PgExecutor, Row};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub id: Uuid,
    pub class_id: i32,
    pub type_id: i32,
}

pub async fn load_item<'e, E>(executor: E, item_id: Uuid) -> LedgerResult<ItemRecord>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query("SELECT id, class_id, type_id FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(executor)
        .await?;

    let row = row.ok_or_else(|| LedgerError::UnknownCode {
        classifier: "item".to_string(),
        code: item_id.to_string(),
    })?;

    Ok(ItemRecord {
        id: row.get("id"),
        class_id: row.get("class_id"),
        type_id: row.get("type_id"),
    })
}
