use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of instrument a subscription refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityKind {
    Equity,
    Option,
    Future,
    Forex,
    Crypto,
    Cfd,
    Index,
}

impl SecurityKind {
    /// Whether the ticker of this kind can change over time through
    /// corporate actions (renames, mergers, spin-offs).
    ///
    /// Options qualify because their ticker follows the underlying.
    pub fn is_corporate_action_sensitive(self) -> bool {
        matches!(self, SecurityKind::Equity | SecurityKind::Option)
    }

    /// Whether instruments of this kind trade on weekends.
    pub fn trades_every_day(self) -> bool {
        matches!(self, SecurityKind::Crypto)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityKind::Equity => "equity",
            SecurityKind::Option => "option",
            SecurityKind::Future => "future",
            SecurityKind::Forex => "forex",
            SecurityKind::Crypto => "crypto",
            SecurityKind::Cfd => "cfd",
            SecurityKind::Index => "index",
        }
    }
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity of an instrument.
///
/// `listing_date` is the as-of date the root ticker refers to; two listings of
/// the same ticker years apart are different identities. Derivatives carry the
/// identity of their underlying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolIdentity {
    pub ticker: String,
    pub kind: SecurityKind,
    pub market: String,
    pub listing_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underlying: Option<Box<SymbolIdentity>>,
}

impl SymbolIdentity {
    pub fn new(
        ticker: impl Into<String>,
        kind: SecurityKind,
        market: impl Into<String>,
        listing_date: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            kind,
            market: market.into(),
            listing_date,
            underlying: None,
        }
    }

    pub fn with_underlying(mut self, underlying: SymbolIdentity) -> Self {
        self.underlying = Some(Box::new(underlying));
        self
    }

    /// The identity whose symbol history drives this instrument's ticker:
    /// the underlying when there is one, otherwise itself.
    pub fn mapping_identity(&self) -> &SymbolIdentity {
        self.underlying.as_deref().unwrap_or(self)
    }
}

impl fmt::Display for SymbolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({}, listed {})", self.kind, self.ticker, self.market, self.listing_date)
    }
}
