//! Records emitted by the enumerator.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar built from trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeBar {
    pub symbol: String,
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One side of a quote bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSide {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub size: f64,
}

/// Bid/ask bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBar {
    pub symbol: String,
    pub time: NaiveDateTime,
    pub bid: QuoteSide,
    pub ask: QuoteSide,
}

/// A single trade print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub time: NaiveDateTime,
    pub price: f64,
    pub quantity: f64,
}

/// One data point of the subscription's declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    TradeBar(TradeBar),
    QuoteBar(QuoteBar),
    Tick(Tick),
}

impl Record {
    pub fn time(&self) -> NaiveDateTime {
        match self {
            Record::TradeBar(b) => b.time,
            Record::QuoteBar(q) => q.time,
            Record::Tick(t) => t.time,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Record::TradeBar(b) => &b.symbol,
            Record::QuoteBar(q) => &q.symbol,
            Record::Tick(t) => &t.symbol,
        }
    }
}
