//! Balance Engine (C5): `current_balance`, `create_daily_snapshot`,
//! `check_sufficient`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::balance_cache::BalanceCache;
use crate::error::{LedgerError, LedgerResult, MissingItem};
use crate::item_key::ItemKey;
use crate::ledger::{Operation, repository as ledger_repo};
use crate::snapshot::{end_of_day, repository as snapshot_repo};

/// Base balance + instant to replay the tail from, derived either from a
/// snapshot or, absent one, from the epoch with a zero balance (spec.md
/// §4.5 step 2).
struct Base {
    balance: i64,
    instant: DateTime<Utc>,
}

fn epoch_base() -> Base {
    Base {
        balance: 0,
        instant: DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Sums a tail of operations onto a base balance and asserts the result is
/// non-negative (spec.md §4.5 step 4: a negative result means the log is
/// corrupt, since every writer enforces invariant 3 before committing).
fn fold_tail(base: i64, tail: &[Operation], item_key: ItemKey) -> LedgerResult<i64> {
    let sum: i64 = tail.iter().map(|op| op.quantity_change).sum();
    let total = base + sum;
    if total < 0 {
        tracing::error!(
            corrupt_item_key = %item_key,
            base,
            tail_sum = sum,
            "operation log produced a negative balance"
        );
        return Err(LedgerError::LogCorrupt {
            item_key: item_key.to_string(),
        });
    }
    Ok(total)
}

pub struct BalanceEngine {
    pool: PgPool,
    cache: BalanceCache,
}

impl BalanceEngine {
    pub fn new(pool: PgPool, cache: BalanceCache) -> Self {
        Self { pool, cache }
    }

    pub fn cache(&self) -> &BalanceCache {
        &self.cache
    }

    /// `current_balance(ItemKey) -> int64` (spec.md §4.5).
    pub async fn current_balance(&self, item_key: ItemKey) -> LedgerResult<i64> {
        if let Some(cached) = self.cache.get(&item_key) {
            return Ok(cached);
        }

        let balance = current_balance_via(&self.pool, item_key).await?;

        self.cache.set(item_key, balance, self.cache.default_ttl());
        Ok(balance)
    }

    /// The authoritative recheck C6 performs inside the committing
    /// transaction (spec.md §4.6 step 3, §5 "Sufficiency under
    /// concurrency"). Never touches the cache — the transaction must see
    /// exactly what it is about to write on top of.
    pub async fn current_balance_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        item_key: ItemKey,
    ) -> LedgerResult<i64> {
        let today = Utc::now().date_naive();
        let base = match snapshot_repo::latest_before(&mut **tx, item_key, today).await? {
            Some(snap) => Base {
                balance: snap.quantity,
                instant: end_of_day(snap.balance_date),
            },
            None => epoch_base(),
        };
        let tail = ledger_repo::operations_since(&mut **tx, item_key, base.instant).await?;
        fold_tail(base.balance, &tail, item_key)
    }

    /// `create_daily_snapshot(ItemKey, target_date) -> DailyBalance`
    /// (spec.md §4.5).
    pub async fn create_daily_snapshot(
        &self,
        item_key: ItemKey,
        target_date: NaiveDate,
    ) -> LedgerResult<crate::snapshot::DailyBalance> {
        if let Some(existing) = snapshot_repo::get(&self.pool, item_key, target_date).await? {
            return Ok(existing);
        }

        let base = match snapshot_repo::latest_before(&self.pool, item_key, target_date).await? {
            Some(snap) => Base {
                balance: snap.quantity,
                instant: end_of_day(snap.balance_date),
            },
            None => epoch_base(),
        };

        let cutoff = end_of_day(target_date);
        let tail = ledger_repo::operations_since(&self.pool, item_key, base.instant).await?;
        let tail: Vec<Operation> = tail.into_iter().filter(|op| op.created_at <= cutoff).collect();
        let final_balance = fold_tail(base.balance, &tail, item_key)?;

        snapshot_repo::put(&self.pool, item_key, target_date, final_balance).await
    }

    /// `check_sufficient(user, section, [(ItemKey, required_qty), ...])`
    /// (spec.md §4.5). Never short-circuits: every failing tuple is
    /// reported.
    pub async fn check_sufficient(
        &self,
        requirements: &[(ItemKey, i64)],
    ) -> LedgerResult<Result<(), Vec<MissingItem>>> {
        let mut missing = Vec::new();
        for &(item_key, required) in requirements {
            let available = self.current_balance(item_key).await?;
            if available < required {
                missing.push(MissingItem {
                    item_key,
                    collection_code: None,
                    quality_code: None,
                    required,
                    available,
                });
            }
        }

        if missing.is_empty() {
            Ok(Ok(()))
        } else {
            Ok(Err(missing))
        }
    }
}

async fn current_balance_via<'e, E>(executor: E, item_key: ItemKey) -> LedgerResult<i64>
where
    E: PgExecutor<'e> + Copy,
{
    let today = Utc::now().date_naive();
    let base = match snapshot_repo::latest_before(executor, item_key, today).await? {
        Some(snap) => Base {
            balance: snap.quantity,
            instant: end_of_day(snap.balance_date),
        },
        None => epoch_base(),
    };
    let tail = ledger_repo::operations_since(executor, item_key, base.instant).await?;
    fold_tail(base.balance, &tail, item_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn op(quantity_change: i64) -> crate::ledger::Operation {
        crate::ledger::Operation {
            id: 1,
            item_key: ItemKey::new(1, 1, Uuid::from_u128(1), None, None),
            quantity_change,
            operation_type_id: 1,
            external_operation_id: None,
            recipe_id: None,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fold_tail_sums_onto_base() {
        let key = ItemKey::new(1, 1, Uuid::from_u128(1), None, None);
        let tail = vec![op(5), op(-2), op(10)];
        assert_eq!(fold_tail(3, &tail, key).unwrap(), 16);
    }

    #[test]
    fn fold_tail_rejects_negative_result() {
        let key = ItemKey::new(1, 1, Uuid::from_u128(1), None, None);
        let tail = vec![op(-10)];
        assert!(matches!(
            fold_tail(3, &tail, key),
            Err(LedgerError::LogCorrupt { .. })
        ));
    }
}
