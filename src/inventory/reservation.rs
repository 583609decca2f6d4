//! Reservation state machine (spec.md §4.7).
//!
//! A reservation is never a row of its own — state is derived by inspecting
//! every `Operation` sharing an `external_operation_id` (spec.md §9,
//! "Reservation state as derived value").

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationState {
    Active,
    Returned,
    Consumed,
}

#[derive(Debug, Clone)]
pub struct ReservedItem {
    pub item_id: Uuid,
    pub collection_id: Option<i32>,
    pub quality_id: Option<i32>,
    pub quantity: i64,
    pub source_section_id: i32,
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub state: ReservationState,
    pub user_id: i64,
    pub items: Vec<ReservedItem>,
}

type GroupKey = (Uuid, Option<i32>, Option<i32>);

/// Groups `rows` by item identity (ignoring section) and classifies the
/// reservation's state from the row count per group: 2 rows (debit source,
/// credit reserved) is ACTIVE; 4 (the original pair plus its inverse) is
/// RETURNED; 3 (the original pair plus a draining debit) is CONSUMED.
pub fn derive(rows: &[Operation], reserved_section_id: i32) -> LedgerResult<Option<Reservation>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let user_id = rows[0].item_key.user_id;

    let mut groups: HashMap<GroupKey, Vec<&Operation>> = HashMap::new();
    for row in rows {
        let key = (
            row.item_key.item_id,
            row.item_key.collection_id,
            row.item_key.quality_id,
        );
        groups.entry(key).or_default().push(row);
    }

    let mut items = Vec::with_capacity(groups.len());
    let mut state = None;

    for ((item_id, collection_id, quality_id), group_rows) in &groups {
        let group_state = match group_rows.len() {
            2 => ReservationState::Active,
            3 => ReservationState::Consumed,
            4 => ReservationState::Returned,
            n => {
                return Err(LedgerError::LogCorrupt {
                    item_key: format!("reservation group for item {item_id} has {n} rows"),
                });
            }
        };

        match state {
            None => state = Some(group_state),
            Some(existing) if existing == group_state => {}
            Some(_) => {
                return Err(LedgerError::LogCorrupt {
                    item_key: "reservation rows disagree on state across items".to_string(),
                });
            }
        }

        let source_row = group_rows
            .iter()
            .find(|op| op.item_key.section_id != reserved_section_id)
            .ok_or_else(|| LedgerError::LogCorrupt {
                item_key: format!("reservation group for item {item_id} has no source-section row"),
            })?;

        let quantity = group_rows
            .iter()
            .filter(|op| op.item_key.section_id == reserved_section_id && op.quantity_change > 0)
            .map(|op| op.quantity_change)
            .next()
            .unwrap_or(0);

        items.push(ReservedItem {
            item_id: *item_id,
            collection_id: *collection_id,
            quality_id: *quality_id,
            quantity,
            source_section_id: source_row.item_key.section_id,
        });
    }

    Ok(Some(Reservation {
        state: state.expect("at least one group, loop body always sets it"),
        user_id,
        items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::item_key::ItemKey;

    const RESERVED: i32 = 99;
    const SOURCE: i32 = 1;

    fn op(section_id: i32, quantity_change: i64) -> Operation {
        Operation {
            id: 1,
            item_key: ItemKey::new(1, section_id, Uuid::from_u128(7), None, None),
            quantity_change,
            operation_type_id: 1,
            external_operation_id: None,
            recipe_id: None,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_rows_is_no_reservation() {
        assert!(derive(&[], RESERVED).unwrap().is_none());
    }

    #[test]
    fn two_rows_is_active() {
        let rows = vec![op(SOURCE, -5), op(RESERVED, 5)];
        let reservation = derive(&rows, RESERVED).unwrap().unwrap();
        assert_eq!(reservation.state, ReservationState::Active);
        assert_eq!(reservation.items[0].quantity, 5);
        assert_eq!(reservation.items[0].source_section_id, SOURCE);
    }

    #[test]
    fn four_rows_is_returned() {
        let rows = vec![op(SOURCE, -5), op(RESERVED, 5), op(RESERVED, -5), op(SOURCE, 5)];
        let reservation = derive(&rows, RESERVED).unwrap().unwrap();
        assert_eq!(reservation.state, ReservationState::Returned);
    }

    #[test]
    fn three_rows_is_consumed() {
        let rows = vec![op(SOURCE, -5), op(RESERVED, 5), op(RESERVED, -5)];
        let reservation = derive(&rows, RESERVED).unwrap().unwrap();
        assert_eq!(reservation.state, ReservationState::Consumed);
    }

    #[test]
    fn unexpected_row_count_is_log_corrupt() {
        let rows = vec![op(SOURCE, -5)];
        assert!(matches!(
            derive(&rows, RESERVED),
            Err(LedgerError::LogCorrupt { .. })
        ));
    }
}
