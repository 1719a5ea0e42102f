//! daystream core: turns a market-data subscription into one continuous,
//! lazily produced stream of records.
//!
//! - Domain types (identities, subscription configs, records)
//! - Symbol history: map files and the resolver that picks the ticker per day
//! - Source location: a registry of locators keyed by data-type tag
//! - Fetch handles for local and remote day files
//! - CSV and Parquet readers behind a format/transport selector
//! - The enumerator that stitches days together in order

pub mod calendar;
pub mod domain;
pub mod enumerator;
pub mod error;
pub mod fetch;
pub mod mapping;
pub mod reader;
pub mod settings;
pub mod source;

pub use enumerator::{EnumeratorFactory, SubscriptionEnumerator};
pub use error::EnumerationError;

#[cfg(test)]
mod tests {
    use super::*;

    fn require_send_sync<T: Send + Sync>() {}

    /// Shared collaborators must be usable from several threads. Checked at
    /// compile time; the test only has to build.
    #[test]
    fn shared_collaborators_are_send_and_sync() {
        require_send_sync::<domain::SubscriptionRequest>();
        require_send_sync::<domain::Record>();
        require_send_sync::<mapping::SymbolHistoryResolver>();
        require_send_sync::<source::LocatorRegistry>();
        require_send_sync::<fetch::HttpFileAccess>();
        require_send_sync::<fetch::LocalFileAccess>();
        require_send_sync::<EnumeratorFactory>();
    }
}
