//! Ledger engine
//!
//! Pure stock computations shared by every screen: the ending-stock formula,
//! default-to-zero quantity parsing, today's movement aggregate and the
//! low-stock predicate. Nothing here holds state; callers pass in the entry
//! list and stock snapshot they just read.

use std::ops::{Add, AddAssign};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Entry, Item};

/// Ending stock after a movement: `opening + received - dispatched - lost`.
///
/// This is the only place the formula lives. The result is not clamped and
/// may be negative; arithmetic saturates instead of overflowing.
pub fn compute_ending(opening: i64, received: i64, dispatched: i64, lost: i64) -> i64 {
    opening
        .saturating_add(received)
        .saturating_sub(dispatched)
        .saturating_sub(lost)
}

/// Coerce a raw form value to a quantity.
///
/// Empty, unparseable or negative input becomes 0. Fractional input is
/// truncated toward zero. Never fails.
pub fn parse_quantity(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    let value = raw.parse::<i64>().ok().or_else(|| {
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
            .and_then(|d| d.trunc().to_i64())
    });
    match value {
        Some(v) if v > 0 => v,
        _ => 0,
    }
}

/// `stock <= minimum`. Equal to the minimum counts as low.
pub fn is_low_stock(stock: i64, minimum: i64) -> bool {
    stock <= minimum
}

/// Sum of each item's current stock snapshot
pub fn roll_up_total_stock(items: &[Item]) -> i64 {
    items.iter().fold(0i64, |acc, item| acc.saturating_add(item.stock))
}

/// Movement totals for one calendar day
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyMovement {
    pub received: i64,
    pub dispatched: i64,
    pub lost: i64,
}

impl Add for DailyMovement {
    type Output = DailyMovement;

    fn add(self, rhs: DailyMovement) -> DailyMovement {
        DailyMovement {
            received: self.received.saturating_add(rhs.received),
            dispatched: self.dispatched.saturating_add(rhs.dispatched),
            lost: self.lost.saturating_add(rhs.lost),
        }
    }
}

impl AddAssign for DailyMovement {
    fn add_assign(&mut self, rhs: DailyMovement) {
        *self = *self + rhs;
    }
}

/// Local calendar date of a timestamp
pub fn local_date<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Sum the movement fields of every entry created on `today` in `tz`.
///
/// Uses each entry's own movement fields, never `ending`.
pub fn aggregate_today<Tz: TimeZone>(entries: &[Entry], today: NaiveDate, tz: &Tz) -> DailyMovement {
    entries
        .iter()
        .filter(|e| local_date(e.created_at, tz) == today)
        .fold(DailyMovement::default(), |acc, e| {
            acc + DailyMovement {
                received: e.received,
                dispatched: e.dispatched,
                lost: e.lost,
            }
        })
}

/// One row of an entry history table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRow {
    pub entry_id: Uuid,
    pub date: NaiveDate,
    pub opening: i64,
    pub received: i64,
    pub dispatched: i64,
    pub lost: i64,
    pub ending: i64,
    pub remarks: Option<String>,
    /// This row's ending is at or below the ledger's minimum
    pub low_stock: bool,
}

/// History rows in the order given, with ending derived per row
pub fn history_rows<Tz: TimeZone>(entries: &[Entry], minimum: i64, tz: &Tz) -> Vec<HistoryRow> {
    entries
        .iter()
        .map(|e| {
            let ending = e.ending();
            HistoryRow {
                entry_id: e.id,
                date: local_date(e.created_at, tz),
                opening: e.opening,
                received: e.received,
                dispatched: e.dispatched,
                lost: e.lost,
                ending,
                remarks: e.remarks.clone(),
                low_stock: is_low_stock(ending, minimum),
            }
        })
        .collect()
}

/// Stock implied by the most recent entry, if any
pub fn reconciled_stock(entries: &[Entry]) -> Option<i64> {
    entries.iter().max_by_key(|e| e.created_at).map(Entry::ending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use proptest::prelude::*;

    fn entry_at(created_at: DateTime<Utc>, opening: i64, received: i64, dispatched: i64, lost: i64) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            item_id: Uuid::nil(),
            subcategory_id: None,
            opening,
            received,
            dispatched,
            lost,
            remarks: None,
            idempotency_key: None,
            created_at,
        }
    }

    fn item(stock: i64) -> Item {
        Item {
            id: Uuid::new_v4(),
            name: "maize".into(),
            stock,
            minimum: 0,
        }
    }

    #[test]
    fn test_compute_ending_allows_negative() {
        assert_eq!(compute_ending(100, 50, 30, 5), 115);
        assert_eq!(compute_ending(0, 0, 10, 5), -15);
    }

    #[test]
    fn test_compute_ending_saturates() {
        assert_eq!(compute_ending(i64::MAX, 1, 0, 0), i64::MAX);
    }

    #[test]
    fn test_parse_quantity_coercions() {
        assert_eq!(parse_quantity("42"), 42);
        assert_eq!(parse_quantity("  7 "), 7);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("twelve"), 0);
        assert_eq!(parse_quantity("12.9"), 12);
        assert_eq!(parse_quantity("1e3"), 1000);
        assert_eq!(parse_quantity("-4"), 0);
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(is_low_stock(50, 50));
        assert!(is_low_stock(49, 50));
        assert!(!is_low_stock(51, 50));
    }

    #[test]
    fn test_roll_up_uses_snapshots() {
        assert_eq!(roll_up_total_stock(&[item(10), item(20), item(-5)]), 25);
        assert_eq!(roll_up_total_stock(&[]), 0);
    }

    #[test]
    fn test_aggregate_today_only_counts_today() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let today = local_date(now, &tz);
        let entries = vec![
            entry_at(now, 100, 10, 5, 1),
            entry_at(now - Duration::hours(2), 0, 20, 0, 0),
            entry_at(now - Duration::days(1), 0, 1000, 1000, 1000),
        ];
        let agg = aggregate_today(&entries, today, &tz);
        assert_eq!(agg, DailyMovement { received: 30, dispatched: 5, lost: 1 });
    }

    #[test]
    fn test_aggregate_today_respects_timezone() {
        // 22:30 UTC on the 9th is already the 10th at UTC+3
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 9, 22, 30, 0).unwrap();
        let entries = vec![entry_at(late, 0, 8, 0, 0)];
        let tenth = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(aggregate_today(&entries, tenth, &tz).received, 8);
        assert_eq!(aggregate_today(&entries, tenth, &Utc).received, 0);
    }

    #[test]
    fn test_history_rows_flag_low_endings() {
        let now = Utc::now();
        let entries = vec![entry_at(now, 100, 0, 60, 0), entry_at(now, 100, 0, 40, 0)];
        let rows = history_rows(&entries, 50, &Utc);
        assert_eq!(rows[0].ending, 40);
        assert!(rows[0].low_stock);
        assert_eq!(rows[1].ending, 60);
        assert!(!rows[1].low_stock);
    }

    #[test]
    fn test_reconciled_stock_takes_latest_entry() {
        let now = Utc::now();
        let entries = vec![
            entry_at(now - Duration::minutes(5), 10, 0, 0, 0),
            entry_at(now, 100, 5, 0, 0),
        ];
        assert_eq!(reconciled_stock(&entries), Some(105));
        assert_eq!(reconciled_stock(&[]), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// ending = opening + received - dispatched - lost, unclamped
        #[test]
        fn prop_ending_formula(
            o in 0i64..1_000_000,
            r in 0i64..1_000_000,
            d in 0i64..1_000_000,
            l in 0i64..1_000_000,
        ) {
            prop_assert_eq!(compute_ending(o, r, d, l), o + r - d - l);
        }

        /// Low stock iff stock <= minimum
        #[test]
        fn prop_low_stock_predicate(stock in -1000i64..1000, minimum in -1000i64..1000) {
            prop_assert_eq!(is_low_stock(stock, minimum), stock <= minimum);
        }

        /// Parsing a rendered non-negative integer gives it back
        #[test]
        fn prop_parse_quantity_integers(n in 0i64..i64::MAX) {
            prop_assert_eq!(parse_quantity(&n.to_string()), n);
        }

        /// Entries from other days never contribute
        #[test]
        fn prop_aggregate_ignores_other_days(
            today_received in prop::collection::vec(0i64..1000, 0..10),
            other_received in prop::collection::vec(0i64..1000, 0..10),
        ) {
            let tz = chrono_tz::Africa::Nairobi;
            let noon = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
            let today = local_date(noon, &tz);
            let mut entries: Vec<Entry> = today_received.iter().map(|r| entry_at(noon, 0, *r, 0, 0)).collect();
            entries.extend(other_received.iter().map(|r| entry_at(noon - Duration::days(2), 0, *r, 0, 0)));
            let agg = aggregate_today(&entries, today, &tz);
            prop_assert_eq!(agg.received, today_received.iter().sum::<i64>());
        }
    }
}
