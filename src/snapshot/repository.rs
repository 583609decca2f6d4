//! Daily Snapshot Store (C3).

use chrono::NaiveDate;
use sqlx::{PgExecutor, Row};

use crate::error::LedgerResult;
use crate::item_key::ItemKey;

use super::models::DailyBalance;

fn row_to_snapshot(row: &sqlx::postgres::PgRow) -> DailyBalance {
    DailyBalance {
        item_key: ItemKey::new(
            row.get("user_id"),
            row.get("section_id"),
            row.get("item_id"),
            row.get("collection_id"),
            row.get("quality_id"),
        ),
        balance_date: row.get("balance_date"),
        quantity: row.get("quantity"),
        created_at: row.get("created_at"),
    }
}

/// A specific day's snapshot for an ItemKey, if one exists.
pub async fn get<'e, E>(
    executor: E,
    item_key: ItemKey,
    date: NaiveDate,
) -> LedgerResult<Option<DailyBalance>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        SELECT user_id, section_id, item_id, collection_id, quality_id,
               balance_date, quantity, created_at
        FROM daily_balances
        WHERE user_id = $1 AND section_id = $2 AND item_id = $3
          AND collection_id IS NOT DISTINCT FROM $4
          AND quality_id IS NOT DISTINCT FROM $5
          AND balance_date = $6
        "#,
    )
    .bind(item_key.user_id)
    .bind(item_key.section_id)
    .bind(item_key.item_id)
    .bind(item_key.collection_id)
    .bind(item_key.quality_id)
    .bind(date)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(row_to_snapshot))
}

/// The most recent snapshot strictly before `date`, if any.
pub async fn latest_before<'e, E>(
    executor: E,
    item_key: ItemKey,
    date: NaiveDate,
) -> LedgerResult<Option<DailyBalance>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        SELECT user_id, section_id, item_id, collection_id, quality_id,
               balance_date, quantity, created_at
        FROM daily_balances
        WHERE user_id = $1 AND section_id = $2 AND item_id = $3
          AND collection_id IS NOT DISTINCT FROM $4
          AND quality_id IS NOT DISTINCT FROM $5
          AND balance_date < $6
        ORDER BY balance_date DESC
        LIMIT 1
        "#,
    )
    .bind(item_key.user_id)
    .bind(item_key.section_id)
    .bind(item_key.item_id)
    .bind(item_key.collection_id)
    .bind(item_key.quality_id)
    .bind(date)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(row_to_snapshot))
}

/// Inserts a new snapshot row. On a uniqueness conflict (a concurrent writer
/// produced the same `(ItemKey, balance_date)` row first) the insert is
/// treated as success and the already-committed row is re-read (spec.md
/// §4.3, §5 "Snapshot creation races").
pub async fn put<'e, E>(
    executor: E,
    item_key: ItemKey,
    date: NaiveDate,
    quantity: i64,
) -> LedgerResult<DailyBalance>
where
    E: PgExecutor<'e> + Copy,
{
    let row = sqlx::query(
        r#"
        INSERT INTO daily_balances
            (user_id, section_id, item_id, collection_id, quality_id, balance_date, quantity, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        ON CONFLICT (user_id, section_id, item_id, collection_id, quality_id, balance_date)
        DO NOTHING
        RETURNING user_id, section_id, item_id, collection_id, quality_id, balance_date, quantity, created_at
        "#,
    )
    .bind(item_key.user_id)
    .bind(item_key.section_id)
    .bind(item_key.item_id)
    .bind(item_key.collection_id)
    .bind(item_key.quality_id)
    .bind(date)
    .bind(quantity)
    .fetch_optional(executor)
    .await?;

    if let Some(row) = row {
        return Ok(row_to_snapshot(&row));
    }

    get(executor, item_key, date)
        .await?
        .ok_or_else(|| crate::error::LedgerError::Internal(
            "daily_balances insert conflicted but no row could be re-read".to_string(),
        ))
}
