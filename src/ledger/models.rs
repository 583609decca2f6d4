//! The append-only `Operation` row (spec.md §3.1).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::item_key::ItemKey;

#[derive(Debug, Clone)]
pub struct Operation {
    pub id: i64,
    pub item_key: ItemKey,
    /// Signed delta on the ItemKey; positive credits, negative debits.
    /// Invariant 2 (spec.md §3.2): never zero.
    pub quantity_change: i64,
    pub operation_type_id: i32,
    pub external_operation_id: Option<Uuid>,
    pub recipe_id: Option<i32>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single row to append, before it has an id or timestamp.
#[derive(Debug, Clone)]
pub struct NewOperation {
    pub item_key: ItemKey,
    pub quantity_change: i64,
    pub operation_type_id: i32,
    pub external_operation_id: Option<Uuid>,
    pub recipe_id: Option<i32>,
    pub comment: Option<String>,
}

impl NewOperation {
    pub fn new(item_key: ItemKey, quantity_change: i64, operation_type_id: i32) -> Self {
        Self {
            item_key,
            quantity_change,
            operation_type_id,
            external_operation_id: None,
            recipe_id: None,
            comment: None,
        }
    }

    pub fn with_external_id(mut self, id: Uuid) -> Self {
        self.external_operation_id = Some(id);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
