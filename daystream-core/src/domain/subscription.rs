//! Subscription configuration and request types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::security::SymbolIdentity;

/// Bar/tick granularity of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Tick,
    Second,
    Minute,
    Hour,
    Daily,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Tick => "tick",
            Resolution::Second => "second",
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
            Resolution::Daily => "daily",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (instrument, data type, resolution) pairing.
///
/// `mapped_symbol` is the ticker the rest of the pipeline labels data with.
/// Enumeration never writes to it: the per-day ticker is passed to the source
/// locator as a separate argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    pub identity: SymbolIdentity,
    pub mapped_symbol: String,
    /// Tag looked up in the locator registry, e.g. `"trade_bar"`.
    pub data_type: String,
    pub resolution: Resolution,
}

impl SubscriptionConfig {
    /// Build a config whose mapped symbol starts out as the identity's ticker.
    pub fn new(identity: SymbolIdentity, data_type: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            mapped_symbol: identity.ticker.clone(),
            identity,
            data_type: data_type.into(),
            resolution,
        }
    }

    pub fn with_mapped_symbol(mut self, mapped_symbol: impl Into<String>) -> Self {
        self.mapped_symbol = mapped_symbol.into();
        self
    }
}

/// A subscription plus the days to enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub config: SubscriptionConfig,
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
    /// Explicit day sequence. When absent the calendar supplies the tradable
    /// days between `start` and `end`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<NaiveDate>>,
}

impl SubscriptionRequest {
    pub fn new(config: SubscriptionConfig, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            config,
            start,
            end,
            days: None,
        }
    }

    /// Use an explicit day sequence instead of the calendar. Order is kept as
    /// given.
    pub fn with_days(mut self, days: Vec<NaiveDate>) -> Self {
        self.days = Some(days);
        self
    }
}
