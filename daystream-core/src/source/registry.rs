//! Locator registry: turns a data-type tag into a runtime `SourceLocator`.
//!
//! Built-in tags: `trade_bar`, `quote_bar`, `tick`. Custom data types register
//! a constructor under their own tag.

use std::collections::BTreeMap;

use super::layout::SourceLayout;
use super::locator::{LayoutLocator, SourceLocator};
use crate::error::EnumerationError;

pub const TRADE_BAR: &str = "trade_bar";
pub const QUOTE_BAR: &str = "quote_bar";
pub const TICK: &str = "tick";

type LocatorCtor = Box<dyn Fn(&SourceLayout) -> Box<dyn SourceLocator> + Send + Sync>;

pub struct LocatorRegistry {
    layout: SourceLayout,
    constructors: BTreeMap<String, LocatorCtor>,
}

impl LocatorRegistry {
    /// Empty registry; every tag fails to construct until registered.
    pub fn empty(layout: SourceLayout) -> Self {
        Self {
            layout,
            constructors: BTreeMap::new(),
        }
    }

    /// Registry with the built-in data types.
    pub fn with_defaults(layout: SourceLayout) -> Self {
        let mut registry = Self::empty(layout);
        registry.register(TRADE_BAR, |l| Box::new(LayoutLocator::trade_bars(l.clone())));
        registry.register(QUOTE_BAR, |l| Box::new(LayoutLocator::quote_bars(l.clone())));
        registry.register(TICK, |l| Box::new(LayoutLocator::ticks(l.clone())));
        registry
    }

    /// Register (or replace) the constructor for `tag`.
    pub fn register<F>(&mut self, tag: &str, ctor: F)
    where
        F: Fn(&SourceLayout) -> Box<dyn SourceLocator> + Send + Sync + 'static,
    {
        self.constructors.insert(tag.to_string(), Box::new(ctor));
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Create the locator for `tag`.
    pub fn create(&self, tag: &str) -> Result<Box<dyn SourceLocator>, EnumerationError> {
        let ctor = self.constructors.get(tag).ok_or_else(|| {
            let known: Vec<&str> = self.tags().collect();
            EnumerationError::Construction(format!(
                "unknown data type '{tag}' (registered: {})",
                known.join(", ")
            ))
        })?;
        Ok(ctor(&self.layout))
    }
}
