//! Per-data-type source locators.

use chrono::NaiveDate;

use super::descriptor::SourceDescriptor;
use super::layout::SourceLayout;
use crate::domain::SubscriptionConfig;
use crate::error::EnumerationError;

/// Tells the enumerator where one day's data lives.
///
/// `mapped_symbol` is the ticker valid on `date`; it may differ from
/// `config.mapped_symbol` after a rename. Implementations must not cache per
/// call state the enumerator relies on.
pub trait SourceLocator: Send + Sync {
    fn get_source(
        &self,
        config: &SubscriptionConfig,
        mapped_symbol: &str,
        date: NaiveDate,
        is_live: bool,
    ) -> Result<SourceDescriptor, EnumerationError>;
}

/// Locator for files laid out by [`SourceLayout`] under a fixed name suffix.
///
/// Serves historical files only; the live flag does not change the location.
#[derive(Debug, Clone)]
pub struct LayoutLocator {
    layout: SourceLayout,
    suffix: &'static str,
}

impl LayoutLocator {
    pub fn trade_bars(layout: SourceLayout) -> Self {
        Self {
            layout,
            suffix: "trade",
        }
    }

    pub fn quote_bars(layout: SourceLayout) -> Self {
        Self {
            layout,
            suffix: "quote",
        }
    }

    pub fn ticks(layout: SourceLayout) -> Self {
        Self {
            layout,
            suffix: "tick",
        }
    }

    pub fn suffix(&self) -> &str {
        self.suffix
    }
}

impl SourceLocator for LayoutLocator {
    fn get_source(
        &self,
        config: &SubscriptionConfig,
        mapped_symbol: &str,
        date: NaiveDate,
        _is_live: bool,
    ) -> Result<SourceDescriptor, EnumerationError> {
        Ok(self.layout.descriptor(config, mapped_symbol, date, self.suffix))
    }
}
