//! Request/response shapes for the Inventory API (spec.md §4.7) — external
//! codes (and the item's own identifier) in, the canonical shapes out;
//! classifier translation happens inside `InventoryApi`, not here.

use uuid::Uuid;

/// One item line in `reserve`/`add`: always a positive quantity.
#[derive(Debug, Clone)]
pub struct ItemAmount {
    pub item_id: Uuid,
    pub collection_code: Option<String>,
    pub quality_code: Option<String>,
    pub quantity: i64,
}

/// One item line in `adjust`: a signed delta, and its own section since an
/// admin adjustment can target any section of the user's inventory.
#[derive(Debug, Clone)]
pub struct AdjustItem {
    pub section_code: String,
    pub item_id: Uuid,
    pub collection_code: Option<String>,
    pub quality_code: Option<String>,
    pub delta: i64,
}

/// One row of a `list` response (spec.md §6.2): the item's own identifier
/// plus its class/type, not a classifier-bound item code.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ListedItem {
    pub item_id: Uuid,
    pub item_class: String,
    pub item_type: String,
    pub collection_code: Option<String>,
    pub quality_code: Option<String>,
    pub quantity: i64,
}
