//! Domain types for daystream

pub mod record;
pub mod security;
pub mod subscription;

pub use record::{QuoteBar, QuoteSide, Record, Tick, TradeBar};
pub use security::{SecurityKind, SymbolIdentity};
pub use subscription::{Resolution, SubscriptionConfig, SubscriptionRequest};
