//! Symbol history resolver.
//!
//! Decides whether a subscription's ticker follows corporate actions, picks the
//! identity whose history applies (the underlying for options) and looks the
//! ticker up for a given day. Loaded map files are cached per listing: market,
//! root ticker and listing date, since a reused ticker has one history per
//! listing.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::map_file::MapFile;
use super::provider::MapFileProvider;
use crate::domain::{SubscriptionConfig, SymbolIdentity};
use crate::error::EnumerationError;

type ListingKey = (String, String, NaiveDate);

fn listing_key(identity: &SymbolIdentity) -> ListingKey {
    (
        identity.market.to_lowercase(),
        identity.ticker.to_uppercase(),
        identity.listing_date,
    )
}

pub struct SymbolHistoryResolver {
    provider: Box<dyn MapFileProvider>,
    cache: Mutex<HashMap<ListingKey, Option<Arc<MapFile>>>>,
}

impl SymbolHistoryResolver {
    pub fn new(provider: impl MapFileProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Map file for `identity`, loading it on first use.
    ///
    /// Misses are cached too, so a missing history costs one provider call.
    pub fn map_file_for(
        &self,
        identity: &SymbolIdentity,
    ) -> Result<Option<Arc<MapFile>>, EnumerationError> {
        let key = listing_key(identity);
        if let Some(hit) = self.lock_cache().get(&key) {
            return Ok(hit.clone());
        }

        let loaded = self.provider.get(identity)?.map(Arc::new);
        self.lock_cache().insert(key, loaded.clone());
        Ok(loaded)
    }

    /// Build the per-subscription mapper. Performs at most one map file lookup.
    pub fn mapper_for(&self, config: &SubscriptionConfig) -> Result<SymbolMapper, EnumerationError> {
        if !config.identity.kind.is_corporate_action_sensitive() {
            return Ok(SymbolMapper::PassThrough);
        }
        let identity = config.identity.mapping_identity();
        Ok(match self.map_file_for(identity)? {
            Some(map_file) => SymbolMapper::History(map_file),
            None => SymbolMapper::Missing {
                ticker: identity.ticker.clone(),
            },
        })
    }

    /// Ticker valid for `config` on `date`.
    pub fn resolve_mapped_symbol(
        &self,
        config: &SubscriptionConfig,
        date: NaiveDate,
    ) -> Result<String, EnumerationError> {
        self.mapper_for(config)?.resolve(config, date)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<ListingKey, Option<Arc<MapFile>>>> {
        // a panic mid-insert cannot leave the map half-written
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Resolved symbol-history capability for one subscription.
#[derive(Debug, Clone)]
pub enum SymbolMapper {
    /// Kind does not follow corporate actions; the configured symbol is used.
    PassThrough,
    /// Ticker history of the mapping identity.
    History(Arc<MapFile>),
    /// Kind follows corporate actions but no history exists.
    Missing { ticker: String },
}

impl SymbolMapper {
    pub fn resolve(
        &self,
        config: &SubscriptionConfig,
        date: NaiveDate,
    ) -> Result<String, EnumerationError> {
        match self {
            SymbolMapper::PassThrough => Ok(config.mapped_symbol.clone()),
            SymbolMapper::History(map_file) => map_file
                .mapped_symbol(date)
                .map(str::to_string)
                .ok_or_else(|| EnumerationError::UnresolvableSymbol {
                    symbol: config.identity.mapping_identity().ticker.clone(),
                    date,
                }),
            SymbolMapper::Missing { ticker } => Err(EnumerationError::UnresolvableSymbol {
                symbol: ticker.clone(),
                date,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Resolution, SecurityKind};
    use crate::mapping::{InMemoryMapFileProvider, MapFileRow};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct CountingProvider {
        inner: InMemoryMapFileProvider,
        calls: Arc<AtomicUsize>,
    }

    impl MapFileProvider for CountingProvider {
        fn get(&self, identity: &SymbolIdentity) -> Result<Option<MapFile>, EnumerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(identity)
        }
    }

    fn equity(ticker: &str) -> SubscriptionConfig {
        let identity = SymbolIdentity::new(ticker, SecurityKind::Equity, "usa", date(2019, 1, 2));
        SubscriptionConfig::new(identity, "trade_bar", Resolution::Minute)
    }

    #[test]
    fn map_files_are_loaded_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            inner: InMemoryMapFileProvider::new().with_rows(
                "usa",
                "ABC",
                vec![MapFileRow::new(date(2019, 1, 2), "ABC")],
            ),
            calls: calls.clone(),
        };
        let resolver = SymbolHistoryResolver::new(provider);
        let config = equity("ABC");

        for day in 2..10 {
            resolver.resolve_mapped_symbol(&config, date(2020, 1, day)).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Answers by listing date: identities listed before 2000 get the old
    /// ABC history, later ones the new listing.
    struct ListingProvider;

    impl MapFileProvider for ListingProvider {
        fn get(&self, identity: &SymbolIdentity) -> Result<Option<MapFile>, EnumerationError> {
            let rows = if identity.listing_date < date(2000, 1, 1) {
                vec![MapFileRow::new(date(1985, 3, 1), "OLD")]
            } else {
                vec![MapFileRow::new(date(2010, 9, 1), "NEW")]
            };
            Ok(Some(MapFile::new(rows)))
        }
    }

    #[test]
    fn reused_ticker_histories_are_cached_per_listing() {
        let resolver = SymbolHistoryResolver::new(ListingProvider);
        let listed = |y| {
            let identity = SymbolIdentity::new("ABC", SecurityKind::Equity, "usa", date(y, 1, 2));
            SubscriptionConfig::new(identity, "trade_bar", Resolution::Daily)
        };
        let day = date(2020, 1, 2);

        assert_eq!(resolver.resolve_mapped_symbol(&listed(1990), day).unwrap(), "OLD");
        assert_eq!(resolver.resolve_mapped_symbol(&listed(2015), day).unwrap(), "NEW");
        // cached entries stay separate
        assert_eq!(resolver.resolve_mapped_symbol(&listed(1990), day).unwrap(), "OLD");
    }

    #[test]
    fn missing_history_is_unresolvable() {
        let resolver = SymbolHistoryResolver::new(InMemoryMapFileProvider::new());
        let result = resolver.resolve_mapped_symbol(&equity("NOPE"), date(2020, 1, 2));
        assert!(matches!(
            result,
            Err(EnumerationError::UnresolvableSymbol { ref symbol, .. }) if symbol == "NOPE"
        ));
    }

    #[test]
    fn pass_through_never_touches_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = SymbolHistoryResolver::new(CountingProvider {
            inner: InMemoryMapFileProvider::new(),
            calls: calls.clone(),
        });
        let identity = SymbolIdentity::new("EURUSD", SecurityKind::Forex, "oanda", date(2000, 1, 3));
        let config = SubscriptionConfig::new(identity, "quote_bar", Resolution::Minute);

        assert!(matches!(resolver.mapper_for(&config).unwrap(), SymbolMapper::PassThrough));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
