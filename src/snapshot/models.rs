//! `DailyBalance` — the lazy end-of-day snapshot (spec.md §3.1).

use chrono::{DateTime, NaiveDate, Utc};

use crate::item_key::ItemKey;

#[derive(Debug, Clone)]
pub struct DailyBalance {
    pub item_key: ItemKey,
    pub balance_date: NaiveDate,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// `end_of_day(D)` as used throughout spec.md §4.5: the instant one
/// nanosecond before the next calendar day begins, UTC.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let next_day = date.succ_opt().expect("balance_date must not be chrono::NaiveDate::MAX");
    DateTime::<Utc>::from_naive_utc_and_offset(next_day.and_hms_opt(0, 0, 0).unwrap(), Utc)
        - chrono::Duration::nanoseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_day_is_last_instant_of_the_day() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 31).unwrap();
        let eod = end_of_day(date);
        assert_eq!(eod.date_naive(), date);
        let next_day_start = eod + chrono::Duration::nanoseconds(1);
        assert_eq!(next_day_start.date_naive(), date.succ_opt().unwrap());
    }
}
