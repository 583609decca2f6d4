//! Operation Log Store (C2): append-only writes, range reads, idempotency
//! lookup.
//!
//! Every read takes `impl sqlx::PgExecutor<'_>` so callers can pass either a
//! bare `&PgPool` or an open `&mut Transaction` — the same flexibility the
//! teacher's `funding::service::TransferService::execute` relies on when it
//! runs balance checks against `&mut *tx` mid-transaction instead of a fresh
//! pool acquire.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Row};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::item_key::ItemKey;

use super::models::{NewOperation, Operation};

fn row_to_operation(row: &sqlx::postgres::PgRow) -> Operation {
    Operation {
        id: row.get("id"),
        item_key: ItemKey::new(
            row.get("user_id"),
            row.get("section_id"),
            row.get("item_id"),
            row.get("collection_id"),
            row.get("quality_id"),
        ),
        quantity_change: row.get("quantity_change"),
        operation_type_id: row.get("operation_type_id"),
        external_operation_id: row.get("external_operation_id"),
        recipe_id: row.get("recipe_id"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
    }
}

/// Appends one or many rows inside the caller's open transaction.
///
/// Rejects rows with `quantity_change = 0` (spec.md §4.2, invariant 2).
pub async fn append(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    rows: &[NewOperation],
) -> LedgerResult<Vec<i64>> {
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        if row.quantity_change == 0 {
            return Err(LedgerError::InvalidRequest(
                "quantity_change must not be zero".to_string(),
            ));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO operations
                (user_id, section_id, item_id, collection_id, quality_id,
                 quantity_change, operation_type_id, external_operation_id,
                 recipe_id, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            RETURNING id
            "#,
        )
        .bind(row.item_key.user_id)
        .bind(row.item_key.section_id)
        .bind(row.item_key.item_id)
        .bind(row.item_key.collection_id)
        .bind(row.item_key.quality_id)
        .bind(row.quantity_change)
        .bind(row.operation_type_id)
        .bind(row.external_operation_id)
        .bind(row.recipe_id)
        .bind(&row.comment)
        .fetch_one(&mut **tx)
        .await?;

        ids.push(id);
    }
    Ok(ids)
}

/// Operations for `item_key` with `created_at` strictly greater than
/// `from_instant`, ordered ascending (the tail scan, spec.md §4.2/§4.5).
pub async fn operations_since<'e, E>(
    executor: E,
    item_key: ItemKey,
    from_instant: DateTime<Utc>,
) -> LedgerResult<Vec<Operation>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, section_id, item_id, collection_id, quality_id,
               quantity_change, operation_type_id, external_operation_id,
               recipe_id, comment, created_at
        FROM operations
        WHERE user_id = $1 AND section_id = $2 AND item_id = $3
          AND collection_id IS NOT DISTINCT FROM $4
          AND quality_id IS NOT DISTINCT FROM $5
          AND created_at > $6
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(item_key.user_id)
    .bind(item_key.section_id)
    .bind(item_key.item_id)
    .bind(item_key.collection_id)
    .bind(item_key.quality_id)
    .bind(from_instant)
    .fetch_all(executor)
    .await?;

    Ok(rows.iter().map(row_to_operation).collect())
}

/// All rows sharing an external operation id, used by return/consume to
/// derive reservation state (spec.md §4.7).
pub async fn find_by_operation_id<'e, E>(
    executor: E,
    operation_id: Uuid,
) -> LedgerResult<Vec<Operation>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, section_id, item_id, collection_id, quality_id,
               quantity_change, operation_type_id, external_operation_id,
               recipe_id, comment, created_at
        FROM operations
        WHERE external_operation_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(operation_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.iter().map(row_to_operation).collect())
}

/// Distinct ItemKeys a user has ever touched within a section, used by
/// `list` (spec.md §4.7) to enumerate candidates before filtering zeros.
pub async fn distinct_item_keys<'e, E>(
    executor: E,
    user_id: i64,
    section_id: i32,
) -> LedgerResult<Vec<ItemKey>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT item_id, collection_id, quality_id
        FROM operations
        WHERE user_id = $1 AND section_id = $2
        "#,
    )
    .bind(user_id)
    .bind(section_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            ItemKey::new(
                user_id,
                section_id,
                row.get("item_id"),
                row.get("collection_id"),
                row.get("quality_id"),
            )
        })
        .collect())
}
