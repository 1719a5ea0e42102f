//! Row layouts shared by the file readers.
//!
//! Every row starts with `millis`, the offset in milliseconds from midnight of
//! the file's day; the remaining columns depend on the data type.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::domain::{QuoteBar, QuoteSide, Record, Tick, TradeBar};
use crate::error::EnumerationError;
use crate::source::registry::{QUOTE_BAR, TICK, TRADE_BAR};

/// Which record a row decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    TradeBar,
    QuoteBar,
    Tick,
}

impl RowKind {
    pub fn for_data_type(tag: &str) -> Option<Self> {
        match tag {
            TRADE_BAR => Some(RowKind::TradeBar),
            QUOTE_BAR => Some(RowKind::QuoteBar),
            TICK => Some(RowKind::Tick),
            _ => None,
        }
    }

    /// Value columns after `millis`.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            RowKind::TradeBar => &["open", "high", "low", "close", "volume"],
            RowKind::QuoteBar => &[
                "bid_open", "bid_high", "bid_low", "bid_close", "bid_size", "ask_open", "ask_high",
                "ask_low", "ask_close", "ask_size",
            ],
            RowKind::Tick => &["price", "quantity"],
        }
    }
}

/// Everything a reader needs to label and time-stamp rows of one day.
#[derive(Debug, Clone)]
pub struct RowContext {
    pub kind: RowKind,
    pub symbol: String,
    pub date: NaiveDate,
}

impl RowContext {
    /// `None` when the offset leaves chrono's representable range.
    pub fn timestamp(&self, millis: i64) -> Option<NaiveDateTime> {
        let offset = TimeDelta::try_milliseconds(millis)?;
        self.date.and_time(NaiveTime::MIN).checked_add_signed(offset)
    }

    /// Decode one row. `values` must hold exactly `kind.columns().len()` items.
    pub fn build(
        &self,
        location: &str,
        millis: i64,
        values: &[f64],
    ) -> Result<Record, EnumerationError> {
        let time = self.timestamp(millis).ok_or_else(|| {
            EnumerationError::read(location, format!("millis {millis} out of range for {}", self.date))
        })?;
        let symbol = self.symbol.clone();
        Ok(match self.kind {
            RowKind::TradeBar => Record::TradeBar(TradeBar {
                symbol,
                time,
                open: values[0],
                high: values[1],
                low: values[2],
                close: values[3],
                volume: values[4],
            }),
            RowKind::QuoteBar => Record::QuoteBar(QuoteBar {
                symbol,
                time,
                bid: QuoteSide {
                    open: values[0],
                    high: values[1],
                    low: values[2],
                    close: values[3],
                    size: values[4],
                },
                ask: QuoteSide {
                    open: values[5],
                    high: values[6],
                    low: values[7],
                    close: values[8],
                    size: values[9],
                },
            }),
            RowKind::Tick => Record::Tick(Tick {
                symbol,
                time,
                price: values[0],
                quantity: values[1],
            }),
        })
    }
}
