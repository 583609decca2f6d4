//! Operation Executor (C6): transactional multi-row append, post-commit
//! cache drop.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::balance_cache::BalanceCache;
use crate::engine::BalanceEngine;
use crate::error::{LedgerError, LedgerResult, MissingItem};
use crate::item_key::ItemKey;
use crate::ledger::{NewOperation, repository as ledger_repo};

const MAX_SERIALIZATION_RETRIES: u32 = 1;

fn validate_batch(rows: &[NewOperation]) -> LedgerResult<()> {
    if rows.is_empty() {
        return Err(LedgerError::InvalidRequest(
            "batch must contain at least one row".to_string(),
        ));
    }

    for row in rows {
        if row.quantity_change == 0 {
            return Err(LedgerError::InvalidRequest(
                "quantity_change must not be zero".to_string(),
            ));
        }
    }

    let external_ids: Vec<_> = rows
        .iter()
        .filter_map(|r| r.external_operation_id)
        .collect();
    if let Some(first) = external_ids.first() {
        if external_ids.iter().any(|id| id != first) {
            return Err(LedgerError::InvalidRequest(
                "all rows in a batch must share the same external_operation_id".to_string(),
            ));
        }
    }

    Ok(())
}

/// Net `quantity_change` per ItemKey touched by the batch, in deterministic
/// `ItemKey` order — this crate uses serializable isolation rather than
/// explicit row locks (spec.md §5, "Sufficiency under concurrency" lists
/// both as valid), but checking and appending in a fixed order still keeps
/// two concurrent batches touching the same keys contending in the same
/// order (spec.md §9, "Transaction discipline").
fn net_changes_by_key(rows: &[NewOperation]) -> Vec<(ItemKey, i64)> {
    let mut totals: HashMap<ItemKey, i64> = HashMap::new();
    for row in rows {
        *totals.entry(row.item_key).or_insert(0) += row.quantity_change;
    }
    let mut entries: Vec<_> = totals.into_iter().collect();
    entries.sort_by_key(|(key, _)| *key);
    entries
}

/// `execute_batch(operations, user) -> [operation_row_id]` (spec.md §4.6).
///
/// `user_id` is whose cache shard gets invalidated after commit — for
/// `adjust` this is the target user, not the admin issuing the call.
pub async fn execute_batch(
    pool: &PgPool,
    balance_cache: &BalanceCache,
    user_id: i64,
    rows: Vec<NewOperation>,
) -> LedgerResult<Vec<i64>> {
    validate_batch(&rows)?;
    let net_changes = net_changes_by_key(&rows);

    let mut attempt = 0;
    loop {
        match try_execute_once(pool, &rows, &net_changes).await {
            Ok(ids) => {
                // Cache invalidation failure is logged but never rolled
                // back (spec.md §4.6 step 6) — best-effort is fine because
                // the TTL bounds staleness either way.
                balance_cache.invalidate_user(user_id);
                return Ok(ids);
            }
            Err(AttemptError::Domain(err)) => return Err(err),
            Err(AttemptError::SerializationConflict) => {
                if attempt >= MAX_SERIALIZATION_RETRIES {
                    return Err(LedgerError::Conflict);
                }
                attempt += 1;
                continue;
            }
        }
    }
}

enum AttemptError {
    Domain(LedgerError),
    SerializationConflict,
}

impl From<LedgerError> for AttemptError {
    fn from(err: LedgerError) -> Self {
        AttemptError::Domain(err)
    }
}

async fn try_execute_once(
    pool: &PgPool,
    rows: &[NewOperation],
    net_changes: &[(ItemKey, i64)],
) -> Result<Vec<i64>, AttemptError> {
    let mut tx = pool.begin().await.map_err(LedgerError::from)?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await
        .map_err(LedgerError::from)?;

    let mut missing = Vec::new();
    for &(item_key, net) in net_changes {
        if net >= 0 {
            continue;
        }
        let balance = BalanceEngine::current_balance_in_tx(&mut tx, item_key).await?;
        if balance + net < 0 {
            missing.push(MissingItem {
                item_key,
                collection_code: None,
                quality_code: None,
                required: -net,
                available: balance,
            });
        }
    }
    if !missing.is_empty() {
        // No partial state survives: the transaction is dropped, never
        // committed (spec.md §4.6 "Rollback").
        return Err(AttemptError::Domain(LedgerError::Insufficient { missing }));
    }

    let ids = match ledger_repo::append(&mut tx, rows).await {
        Ok(ids) => ids,
        Err(err) => return Err(classify_commit_error(err)),
    };

    match tx.commit().await {
        Ok(()) => Ok(ids),
        Err(err) => Err(classify_commit_error(LedgerError::from(err))),
    }
}

fn classify_commit_error(err: LedgerError) -> AttemptError {
    if crate::error::is_serialization_failure(&err) {
        return AttemptError::SerializationConflict;
    }
    AttemptError::Domain(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_batch_rejects_empty() {
        assert!(validate_batch(&[]).is_err());
    }

    #[test]
    fn validate_batch_rejects_zero_delta() {
        let rows = vec![NewOperation::new(ItemKey::new(1, 1, uuid::Uuid::from_u128(1), None, None), 0, 1)];
        assert!(validate_batch(&rows).is_err());
    }

    #[test]
    fn validate_batch_rejects_mismatched_external_ids() {
        let key = ItemKey::new(1, 1, uuid::Uuid::from_u128(1), None, None);
        let rows = vec![
            NewOperation::new(key, 5, 1).with_external_id(uuid::Uuid::new_v4()),
            NewOperation::new(key, -5, 1).with_external_id(uuid::Uuid::new_v4()),
        ];
        assert!(validate_batch(&rows).is_err());
    }

    #[test]
    fn net_changes_by_key_sums_per_key_and_is_sorted() {
        let a = ItemKey::new(1, 2, uuid::Uuid::from_u128(1), None, None);
        let b = ItemKey::new(1, 1, uuid::Uuid::from_u128(1), None, None);
        let rows = vec![
            NewOperation::new(a, 5, 1),
            NewOperation::new(b, -3, 1),
            NewOperation::new(a, -2, 1),
        ];
        let nets = net_changes_by_key(&rows);
        assert_eq!(nets, vec![(b, -3), (a, 3)]);
    }
}
