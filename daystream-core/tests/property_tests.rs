//! Property tests for symbol history and day enumeration.
//!
//! Uses proptest to verify:
//! 1. Map file lookup returns the most recent row at or before the date
//! 2. Lookups before the first row never resolve
//! 3. Row order on input does not change lookups
//! 4. The calendar yields ascending, in-range, tradable days only

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;

use daystream_core::calendar::TradingCalendar;
use daystream_core::mapping::{MapFile, MapFileRow};

// ── Strategies (proptest) ────────────────────────────────────────────

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..9_000).prop_map(|offset| base() + Duration::days(offset))
}

fn arb_ticker() -> impl Strategy<Value = String> {
    "[A-Z]{1,5}"
}

/// Rows with distinct dates, in arbitrary order.
fn arb_rows() -> impl Strategy<Value = Vec<MapFileRow>> {
    prop::collection::btree_map(0i64..9_000, arb_ticker(), 1..12).prop_map(|m| {
        m.into_iter()
            .map(|(offset, ticker)| MapFileRow::new(base() + Duration::days(offset), ticker))
            .rev()
            .collect()
    })
}

// ── 1. Most recent prior row wins ────────────────────────────────────

proptest! {
    #[test]
    fn lookup_matches_linear_scan(rows in arb_rows(), date in arb_date()) {
        let expected = rows
            .iter()
            .filter(|r| r.date <= date)
            .max_by_key(|r| r.date)
            .map(|r| r.ticker.clone());

        let map_file = MapFile::new(rows);
        prop_assert_eq!(map_file.mapped_symbol(date).map(str::to_string), expected);
    }
}

// ── 2. Before the history starts ─────────────────────────────────────

proptest! {
    #[test]
    fn dates_before_first_row_do_not_resolve(rows in arb_rows(), back in 1i64..1_000) {
        let map_file = MapFile::new(rows);
        let first = map_file.first_date().unwrap();
        prop_assert!(map_file.mapped_symbol(first - Duration::days(back)).is_none());
        prop_assert!(map_file.mapped_symbol(first).is_some());
    }
}

// ── 3. Input order is irrelevant ─────────────────────────────────────

proptest! {
    #[test]
    fn shuffled_rows_give_same_lookups(rows in arb_rows(), date in arb_date()) {
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = MapFile::new(rows);
        let b = MapFile::new(reversed);
        prop_assert_eq!(a.rows(), b.rows());
        prop_assert_eq!(a.mapped_symbol(date), b.mapped_symbol(date));
    }
}

// ── 4. Calendar ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn calendar_days_are_sorted_tradable_and_in_range(
        start in arb_date(),
        span in 0i64..120,
        holidays in prop::collection::vec(arb_date(), 0..20),
        every_day in any::<bool>(),
    ) {
        let end = start + Duration::days(span);
        let calendar = TradingCalendar::with_holidays(holidays.iter().copied());
        let days: Vec<NaiveDate> = calendar.tradable_days(start, end, every_day).collect();

        prop_assert!(days.windows(2).all(|w| w[0] < w[1]));
        for d in &days {
            prop_assert!(*d >= start && *d <= end);
            prop_assert!(!holidays.contains(d));
            if !every_day {
                prop_assert!(!matches!(d.weekday(), Weekday::Sat | Weekday::Sun));
            }
        }

        let expected = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| calendar.is_tradable(*d, every_day))
            .count();
        prop_assert_eq!(days.len(), expected);
    }
}
