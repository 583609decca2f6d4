//! Inventory API (C7): `list`, `reserve`, `return_reserve`, `consume_reserve`,
//! `add`, `adjust`. All operations accept and return external codes; this is
//! the boundary where C1 translation happens (spec.md §4.7).

pub mod models;
pub mod reservation;

use std::sync::Arc;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::balance_cache::BalanceCache;
use crate::catalog::Catalog;
use crate::catalog::items as item_catalog;
use crate::catalog::models::{TranslateDirection, TranslatedField, field};
use crate::engine::BalanceEngine;
use crate::error::{LedgerError, LedgerResult, MissingItem};
use crate::executor;
use crate::item_key::ItemKey;
use crate::ledger::{NewOperation, repository as ledger_repo};

pub use models::{AdjustItem, ItemAmount, ListedItem};
use reservation::ReservationState;

/// Classifier codes every Inventory API call translates through (spec.md
/// §4.1). The item's own identifier is not a classifier code — it is the
/// Item entity's UUID (spec.md §3.1) — but its class/type are looked up from
/// the `item_class`/`item_type` classifiers via `catalog::items::load_item`.
pub mod codes {
    pub const SECTION: &str = "inventory_section";
    pub const ITEM_CLASS: &str = "item_class";
    pub const ITEM_TYPE: &str = "item_type";
    pub const COLLECTION: &str = "collection";
    pub const QUALITY: &str = "item_quality";
    pub const OPERATION_TYPE: &str = "operation_type";

    pub const OP_TRANSFER: &str = "transfer";
    pub const OP_ADMIN_ADJUST: &str = "admin_adjust";
}

/// Every item line carries the same two classifier-bound fields beyond its
/// own identifier (spec.md §4.1 operation 4: `translate(request_object,
/// direction)`), so `ItemKey` resolution in both directions walks this
/// schema instead of two separate `code_to_id`/`id_to_code` calls.
const ITEM_SCHEMA: &[TranslatedField] = &[
    field("collection", codes::COLLECTION),
    field("quality", codes::QUALITY),
];

fn translated_id(value: &serde_json::Value, field_name: &str) -> Option<i32> {
    value.get(field_name).and_then(|v| v.as_i64()).map(|v| v as i32)
}

pub struct InventoryApi {
    pool: PgPool,
    catalog: Arc<Catalog>,
    engine: Arc<BalanceEngine>,
    reserved_section_code: String,
}

impl InventoryApi {
    pub fn new(
        pool: PgPool,
        catalog: Arc<Catalog>,
        engine: Arc<BalanceEngine>,
        reserved_section_code: String,
    ) -> Self {
        Self {
            pool,
            catalog,
            engine,
            reserved_section_code,
        }
    }

    fn balance_cache(&self) -> &BalanceCache {
        self.engine.cache()
    }

    async fn resolve_section(&self, section_code: &str) -> LedgerResult<i32> {
        self.catalog.code_to_id(codes::SECTION, section_code).await
    }

    async fn reserved_section_id(&self) -> LedgerResult<i32> {
        self.resolve_section(&self.reserved_section_code).await
    }

    async fn operation_type_id(&self, code: &str) -> LedgerResult<i32> {
        self.catalog.code_to_id(codes::OPERATION_TYPE, code).await
    }

    async fn resolve_item_key(
        &self,
        user_id: i64,
        section_id: i32,
        item_id: Uuid,
        collection_code: Option<&str>,
        quality_code: Option<&str>,
    ) -> LedgerResult<ItemKey> {
        // Confirms the item exists before it's used as a balance key —
        // unknown identifiers fail the same way an unmappable code does.
        item_catalog::load_item(&self.pool, item_id).await?;

        let mut object = json!({
            "collection": collection_code,
            "quality": quality_code,
        });
        self.catalog
            .translate(&mut object, ITEM_SCHEMA, TranslateDirection::CodeToId)
            .await?;

        Ok(ItemKey::new(
            user_id,
            section_id,
            item_id,
            translated_id(&object, "collection"),
            translated_id(&object, "quality"),
        ))
    }

    async fn item_key_to_listed(&self, key: ItemKey, quantity: i64) -> LedgerResult<ListedItem> {
        let item = item_catalog::load_item(&self.pool, key.item_id).await?;
        let item_class = self.catalog.id_to_code(codes::ITEM_CLASS, item.class_id).await?;
        let item_type = self.catalog.id_to_code(codes::ITEM_TYPE, item.type_id).await?;

        let mut object = json!({
            "collection": key.collection_id,
            "quality": key.quality_id,
        });
        self.catalog
            .translate(&mut object, ITEM_SCHEMA, TranslateDirection::IdToCode)
            .await?;

        Ok(ListedItem {
            item_id: key.item_id,
            item_class,
            item_type,
            collection_code: object.get("collection").and_then(|v| v.as_str()).map(str::to_string),
            quality_code: object.get("quality").and_then(|v| v.as_str()).map(str::to_string),
            quantity,
        })
    }

    /// Resolves the `collection`/`quality` codes a `missing` diagnostic
    /// carries only as internal identifiers, the same way `item_key_to_listed`
    /// translates a successful row (spec.md §6.2's `Insufficient` body wants
    /// codes, not ids).
    async fn translate_missing(&self, missing: Vec<MissingItem>) -> LedgerResult<Vec<MissingItem>> {
        let mut out = Vec::with_capacity(missing.len());
        for mut entry in missing {
            if let Some(id) = entry.item_key.collection_id {
                entry.collection_code = Some(self.catalog.id_to_code(codes::COLLECTION, id).await?);
            }
            if let Some(id) = entry.item_key.quality_id {
                entry.quality_code = Some(self.catalog.id_to_code(codes::QUALITY, id).await?);
            }
            out.push(entry);
        }
        Ok(out)
    }

    /// Runs a batch through the executor, translating an `Insufficient`
    /// diagnostic before it leaves the Inventory API (see `translate_missing`).
    async fn execute_batch(&self, user_id: i64, rows: Vec<NewOperation>) -> LedgerResult<Vec<i64>> {
        match executor::execute_batch(&self.pool, self.balance_cache(), user_id, rows).await {
            Err(LedgerError::Insufficient { missing }) => Err(LedgerError::Insufficient {
                missing: self.translate_missing(missing).await?,
            }),
            other => other,
        }
    }

    /// `list(user, section)` (spec.md §4.7). Ordering is unspecified.
    #[tracing::instrument(skip(self), fields(user_id, section = section_code))]
    pub async fn list(&self, user_id: i64, section_code: &str) -> LedgerResult<Vec<ListedItem>> {
        let section_id = self.resolve_section(section_code).await?;
        let keys = ledger_repo::distinct_item_keys(&self.pool, user_id, section_id).await?;

        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let quantity = self.engine.current_balance(key).await?;
            if quantity == 0 {
                continue;
            }
            out.push(self.item_key_to_listed(key, quantity).await?);
        }
        Ok(out)
    }

    /// `reserve(user, op_id, items[])` (spec.md §4.7): debits `source`,
    /// credits the reserved section, both tagged with `op_id`.
    #[tracing::instrument(skip(self, items), fields(user_id, operation_id = %op_id, section = source_section_code))]
    pub async fn reserve(
        &self,
        user_id: i64,
        op_id: Uuid,
        source_section_code: &str,
        items: &[ItemAmount],
    ) -> LedgerResult<Vec<i64>> {
        if !ledger_repo::find_by_operation_id(&self.pool, op_id)
            .await?
            .is_empty()
        {
            return Err(LedgerError::ReservationExists(op_id.to_string()));
        }

        let source_section_id = self.resolve_section(source_section_code).await?;
        let reserved_section_id = self.reserved_section_id().await?;
        let op_type = self.operation_type_id(codes::OP_TRANSFER).await?;

        let mut requirements = Vec::with_capacity(items.len());
        let mut rows = Vec::with_capacity(items.len() * 2);
        for amount in items {
            let source_key = self
                .resolve_item_key(
                    user_id,
                    source_section_id,
                    amount.item_id,
                    amount.collection_code.as_deref(),
                    amount.quality_code.as_deref(),
                )
                .await?;
            let reserved_key = source_key.with_section(reserved_section_id);

            requirements.push((source_key, amount.quantity));
            rows.push(NewOperation::new(source_key, -amount.quantity, op_type).with_external_id(op_id));
            rows.push(NewOperation::new(reserved_key, amount.quantity, op_type).with_external_id(op_id));
        }

        // Advisory pre-flight (spec.md §5, "Sufficiency under concurrency");
        // the authoritative recheck happens inside executor::execute_batch.
        if let Err(missing) = self.engine.check_sufficient(&requirements).await? {
            return Err(LedgerError::Insufficient {
                missing: self.translate_missing(missing).await?,
            });
        }

        self.execute_batch(user_id, rows).await
    }

    async fn active_reservation(
        &self,
        user_id: i64,
        op_id: Uuid,
    ) -> LedgerResult<reservation::Reservation> {
        let reserved_section_id = self.reserved_section_id().await?;
        let rows = ledger_repo::find_by_operation_id(&self.pool, op_id).await?;
        let reservation = reservation::derive(&rows, reserved_section_id)?
            .ok_or_else(|| LedgerError::ReservationNotFound(op_id.to_string()))?;

        if reservation.user_id != user_id {
            return Err(LedgerError::Forbidden);
        }
        if reservation.state != ReservationState::Active {
            return Err(LedgerError::ReservationTerminal(op_id.to_string()));
        }
        Ok(reservation)
    }

    /// `return_reserve(user, op_id)` (spec.md §4.7): writes the inverse of
    /// every existing row, tagged with the same `op_id` so state derivation
    /// on a later call sees the full history.
    #[tracing::instrument(skip(self), fields(user_id, operation_id = %op_id))]
    pub async fn return_reserve(&self, user_id: i64, op_id: Uuid) -> LedgerResult<Vec<i64>> {
        let reserved_section_id = self.reserved_section_id().await?;
        let reservation = self.active_reservation(user_id, op_id).await?;
        let op_type = self.operation_type_id(codes::OP_TRANSFER).await?;

        let mut rows = Vec::with_capacity(reservation.items.len() * 2);
        for item in &reservation.items {
            let reserved_key =
                ItemKey::new(user_id, reserved_section_id, item.item_id, item.collection_id, item.quality_id);
            let source_key = reserved_key.with_section(item.source_section_id);
            rows.push(NewOperation::new(reserved_key, -item.quantity, op_type).with_external_id(op_id));
            rows.push(NewOperation::new(source_key, item.quantity, op_type).with_external_id(op_id));
        }

        self.execute_batch(user_id, rows).await
    }

    /// `consume_reserve(user, op_id)` (spec.md §4.7): debits the reserved
    /// section per row; the credit side is silently dropped.
    #[tracing::instrument(skip(self), fields(user_id, operation_id = %op_id))]
    pub async fn consume_reserve(&self, user_id: i64, op_id: Uuid) -> LedgerResult<Vec<i64>> {
        let reserved_section_id = self.reserved_section_id().await?;
        let reservation = self.active_reservation(user_id, op_id).await?;
        let op_type = self.operation_type_id(codes::OP_TRANSFER).await?;

        let mut rows = Vec::with_capacity(reservation.items.len());
        for item in &reservation.items {
            let reserved_key =
                ItemKey::new(user_id, reserved_section_id, item.item_id, item.collection_id, item.quality_id);
            rows.push(NewOperation::new(reserved_key, -item.quantity, op_type).with_external_id(op_id));
        }

        self.execute_batch(user_id, rows).await
    }

    /// `add(user, op_id, items[])` (spec.md §4.7): no preconditions, credits
    /// the target section.
    #[tracing::instrument(skip(self, items), fields(user_id, operation_id = %op_id, section = target_section_code))]
    pub async fn add(
        &self,
        user_id: i64,
        op_id: Uuid,
        target_section_code: &str,
        items: &[ItemAmount],
    ) -> LedgerResult<Vec<i64>> {
        let target_section_id = self.resolve_section(target_section_code).await?;
        let op_type = self.operation_type_id(codes::OP_TRANSFER).await?;

        let mut rows = Vec::with_capacity(items.len());
        for amount in items {
            let key = self
                .resolve_item_key(
                    user_id,
                    target_section_id,
                    amount.item_id,
                    amount.collection_code.as_deref(),
                    amount.quality_code.as_deref(),
                )
                .await?;
            rows.push(NewOperation::new(key, amount.quantity, op_type).with_external_id(op_id));
        }

        self.execute_batch(user_id, rows).await
    }

    /// `adjust(admin, target_user, items[], reason)` (spec.md §4.7). Negative
    /// deltas are sufficiency-checked; adjusting the reserved section
    /// directly is rejected (spec.md §9, open question resolved in favor of
    /// `InvalidRequest`).
    #[tracing::instrument(skip(self, items, reason), fields(admin_id, target_user_id, operation_id = %op_id))]
    pub async fn adjust(
        &self,
        admin_id: i64,
        target_user_id: i64,
        op_id: Uuid,
        items: &[AdjustItem],
        reason: &str,
    ) -> LedgerResult<Vec<i64>> {
        let reserved_section_id = self.reserved_section_id().await?;
        let op_type = self.operation_type_id(codes::OP_ADMIN_ADJUST).await?;

        let mut requirements = Vec::new();
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let section_id = self.resolve_section(&item.section_code).await?;
            if section_id == reserved_section_id {
                return Err(LedgerError::InvalidRequest(
                    "adjust may not target the reserved section directly".to_string(),
                ));
            }

            let key = self
                .resolve_item_key(
                    target_user_id,
                    section_id,
                    item.item_id,
                    item.collection_code.as_deref(),
                    item.quality_code.as_deref(),
                )
                .await?;
            if item.delta < 0 {
                requirements.push((key, -item.delta));
            }
            rows.push(
                NewOperation::new(key, item.delta, op_type)
                    .with_external_id(op_id)
                    .with_comment(reason),
            );
        }

        if !requirements.is_empty() {
            if let Err(missing) = self.engine.check_sufficient(&requirements).await? {
                return Err(LedgerError::Insufficient {
                    missing: self.translate_missing(missing).await?,
                });
            }
        }

        tracing::info!(admin_id, target_user_id, reason, "admin inventory adjustment");
        self.execute_batch(target_user_id, rows).await
    }
}
