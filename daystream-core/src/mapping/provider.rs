//! Map file providers.
//!
//! The provider abstracts over where symbol histories live so the resolver can
//! be fed from disk in production and from memory in tests.
//!
//! A ticker can be reused: the same root ticker may name several listings
//! years apart, each with its own history. Providers keep every listing of a
//! ticker and pick the one that applies to the identity's as-of date with
//! [`select_listing`].

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::map_file::{MapFile, MapFileRow};
use crate::domain::SymbolIdentity;
use crate::error::EnumerationError;

/// Source of map files keyed by identity.
pub trait MapFileProvider: Send + Sync {
    /// Map file for `identity`, or `Ok(None)` if the store has none.
    fn get(&self, identity: &SymbolIdentity) -> Result<Option<MapFile>, EnumerationError>;
}

/// Storage key of a ticker's listings: market plus upper-cased root ticker.
fn ticker_key(market: &str, ticker: &str) -> (String, String) {
    (market.to_lowercase(), ticker.to_uppercase())
}

/// Pick the listing of `ticker` that applies on `as_of`.
///
/// In order of preference:
/// 1. a history in which `ticker` is the ticker in effect on `as_of`
/// 2. the listing that most recently started on or before `as_of`
/// 3. the earliest listing, when `as_of` predates every recorded history
pub fn select_listing<'a>(
    listings: impl IntoIterator<Item = &'a MapFile>,
    ticker: &str,
    as_of: NaiveDate,
) -> Option<&'a MapFile> {
    let listings: Vec<&'a MapFile> = listings.into_iter().filter(|m| !m.is_empty()).collect();

    let in_effect = listings
        .iter()
        .copied()
        .filter(|m| {
            m.mapped_symbol(as_of)
                .is_some_and(|t| t.eq_ignore_ascii_case(ticker))
        })
        .max_by_key(|m| started(m));
    if in_effect.is_some() {
        return in_effect;
    }

    listings
        .iter()
        .copied()
        .filter(|m| started(m) <= as_of)
        .max_by_key(|m| started(m))
        .or_else(|| listings.iter().copied().min_by_key(|m| started(m)))
}

fn started(map_file: &MapFile) -> NaiveDate {
    map_file.first_date().unwrap_or(NaiveDate::MAX)
}

/// Map files held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMapFileProvider {
    files: HashMap<(String, String), Vec<MapFile>>,
}

impl InMemoryMapFileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listing of `ticker` in `market`.
    pub fn with_rows(mut self, market: &str, ticker: &str, rows: Vec<MapFileRow>) -> Self {
        self.insert(market, ticker, MapFile::new(rows));
        self
    }

    /// Add a listing. Earlier listings of the same ticker are kept.
    pub fn insert(&mut self, market: &str, ticker: &str, map_file: MapFile) {
        self.files
            .entry(ticker_key(market, ticker))
            .or_default()
            .push(map_file);
    }
}

impl MapFileProvider for InMemoryMapFileProvider {
    fn get(&self, identity: &SymbolIdentity) -> Result<Option<MapFile>, EnumerationError> {
        let Some(listings) = self.files.get(&ticker_key(&identity.market, &identity.ticker)) else {
            return Ok(None);
        };
        Ok(select_listing(listings, &identity.ticker, identity.listing_date).cloned())
    }
}

/// Map files stored as CSV on disk.
///
/// Layout: `{root}/{market}/{ticker}.csv` for a ticker's listing, plus
/// `{root}/{market}/{ticker}@{label}.csv` for further listings of a reused
/// ticker (the label is free-form, e.g. the listing year). Names are
/// lower-cased.
pub struct LocalMapFileProvider {
    root: PathBuf,
}

impl LocalMapFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every map file naming a listing of `identity`'s ticker.
    fn listing_paths(&self, identity: &SymbolIdentity) -> Result<Vec<PathBuf>, EnumerationError> {
        let market_dir = self.root.join(identity.market.to_lowercase());
        if !market_dir.is_dir() {
            return Ok(Vec::new());
        }

        let ticker = identity.ticker.to_lowercase();
        let mut paths = Vec::new();
        for entry in fs::read_dir(&market_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let root_ticker = stem.split_once('@').map_or(stem, |(t, _)| t);
            if root_ticker.to_lowercase() == ticker {
                paths.push(path);
            }
        }
        // stable order for error reporting
        paths.sort();
        Ok(paths)
    }
}

impl MapFileProvider for LocalMapFileProvider {
    fn get(&self, identity: &SymbolIdentity) -> Result<Option<MapFile>, EnumerationError> {
        let mut listings = Vec::new();
        for path in self.listing_paths(identity)? {
            let content = fs::read_to_string(&path)?;
            let map_file = MapFile::parse(&content, &path)?;
            tracing::debug!(path = %path.display(), rows = map_file.len(), "loaded map file");
            listings.push(map_file);
        }

        let selected = select_listing(&listings, &identity.ticker, identity.listing_date).cloned();
        if listings.len() > 1 {
            tracing::debug!(
                identity = %identity,
                listings = listings.len(),
                first_date = ?selected.as_ref().and_then(MapFile::first_date),
                "selected listing of reused ticker"
            );
        }
        Ok(selected)
    }
}
