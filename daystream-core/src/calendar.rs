//! Tradable-day enumeration.
//!
//! The enumerator asks a [`DaySequence`] for the days of a request. The default
//! [`TradingCalendar`] skips weekends (crypto excepted) and configured holidays.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

use crate::domain::SubscriptionRequest;

/// Supplies the ordered days a request covers.
pub trait DaySequence: Send + Sync {
    fn days<'a>(&'a self, request: &'a SubscriptionRequest) -> Box<dyn Iterator<Item = NaiveDate> + 'a>;
}

/// Weekday calendar with a holiday list.
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl TradingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Whether `date` is tradable; `every_day` disables the weekend rule.
    pub fn is_tradable(&self, date: NaiveDate, every_day: bool) -> bool {
        if self.is_holiday(date) {
            return false;
        }
        every_day || !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Tradable days in `[start, end]`, ascending.
    pub fn tradable_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        every_day: bool,
    ) -> impl Iterator<Item = NaiveDate> + '_ {
        start
            .iter_days()
            .take_while(move |d| *d <= end)
            .filter(move |d| self.is_tradable(*d, every_day))
    }
}

impl DaySequence for TradingCalendar {
    fn days<'a>(&'a self, request: &'a SubscriptionRequest) -> Box<dyn Iterator<Item = NaiveDate> + 'a> {
        if let Some(days) = &request.days {
            return Box::new(days.iter().copied());
        }
        let every_day = request.config.identity.kind.trades_every_day();
        Box::new(self.tradable_days(request.start, request.end, every_day))
    }
}
