//! Map file: the dated ticker history of one instrument.
//!
//! Each row says "from this date on, the instrument trades as this ticker".
//! A lookup returns the most recent row on or before the queried date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EnumerationError;

/// One `(effective date, ticker)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFileRow {
    pub date: NaiveDate,
    pub ticker: String,
}

impl MapFileRow {
    pub fn new(date: NaiveDate, ticker: impl Into<String>) -> Self {
        Self {
            date,
            ticker: ticker.into(),
        }
    }
}

/// Ticker history for one root identity, sorted by date ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapFile {
    rows: Vec<MapFileRow>,
}

impl MapFile {
    /// Build from rows in any order. Later duplicates of the same date win.
    pub fn new(mut rows: Vec<MapFileRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        // keep the last row for each date (stable sort preserves input order)
        let mut deduped: Vec<MapFileRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match deduped.last_mut() {
                Some(last) if last.date == row.date => *last = row,
                _ => deduped.push(row),
            }
        }
        Self { rows: deduped }
    }

    /// Parse the CSV text form: `yyyymmdd,ticker` per line.
    ///
    /// Blank lines and lines starting with `#` are ignored. `path` is only used
    /// for error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, EnumerationError> {
        let mut rows = Vec::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let bad = |reason: String| EnumerationError::MapFileFormat {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
            };

            let mut fields = line.split(',').map(str::trim);
            let date_str = fields.next().unwrap_or_default();
            let ticker = fields
                .next()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| bad("missing ticker".into()))?;
            let date = NaiveDate::parse_from_str(date_str, "%Y%m%d")
                .map_err(|e| bad(format!("bad date '{date_str}': {e}")))?;

            rows.push(MapFileRow::new(date, ticker.to_uppercase()));
        }
        Ok(Self::new(rows))
    }

    /// Ticker in effect on `date`, or `None` if `date` precedes every row.
    pub fn mapped_symbol(&self, date: NaiveDate) -> Option<&str> {
        let idx = self.rows.partition_point(|r| r.date <= date);
        idx.checked_sub(1).map(|i| self.rows[i].ticker.as_str())
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    /// The most recent ticker, i.e. what the instrument trades as today.
    pub fn current_ticker(&self) -> Option<&str> {
        self.rows.last().map(|r| r.ticker.as_str())
    }

    pub fn rows(&self) -> &[MapFileRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
