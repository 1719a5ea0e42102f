//! Settings file: where data lives and which subscription to enumerate.
//!
//! ```toml
//! [data]
//! data_root = "data"
//! format = "csv"
//!
//! [subscription]
//! ticker = "AAPL"
//! kind = "equity"
//! market = "usa"
//! listing_date = "1998-01-02"
//! start = "2024-01-02"
//! end = "2024-01-31"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::TradingCalendar;
use crate::domain::{Resolution, SecurityKind, SubscriptionConfig, SubscriptionRequest, SymbolIdentity};
use crate::mapping::LocalMapFileProvider;
use crate::source::{FileFormat, SourceLayout};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    pub subscription: SubscriptionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSettings {
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Defaults to `{data_root}/map_files`.
    #[serde(default)]
    pub map_file_root: Option<PathBuf>,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// When set, day files are downloaded from here instead of `data_root`.
    #[serde(default)]
    pub remote_base_url: Option<String>,
    #[serde(default = "default_format")]
    pub format: FileFormat,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            map_file_root: None,
            cache_dir: default_cache_dir(),
            remote_base_url: None,
            format: default_format(),
            holidays: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionSettings {
    pub ticker: String,
    pub kind: SecurityKind,
    pub market: String,
    pub listing_date: NaiveDate,
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default = "default_resolution")]
    pub resolution: Resolution,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Explicit days; replaces the calendar when present.
    #[serde(default)]
    pub days: Option<Vec<NaiveDate>>,
    #[serde(default)]
    pub underlying: Option<UnderlyingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnderlyingSettings {
    pub ticker: String,
    pub kind: SecurityKind,
    pub market: String,
    pub listing_date: NaiveDate,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_format() -> FileFormat {
    FileFormat::Csv
}

fn default_log_level() -> String {
    "info".into()
}

fn default_data_type() -> String {
    "trade_bar".into()
}

fn default_resolution() -> Resolution {
    Resolution::Minute
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sub = &self.subscription;
        if sub.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("subscription.ticker is empty".into()));
        }
        if sub.market.trim().is_empty() {
            return Err(ConfigError::Invalid("subscription.market is empty".into()));
        }
        if sub.start > sub.end {
            return Err(ConfigError::Invalid(format!(
                "subscription.start {} is after subscription.end {}",
                sub.start, sub.end
            )));
        }
        if sub.kind == SecurityKind::Option && sub.underlying.is_none() {
            return Err(ConfigError::Invalid(
                "option subscriptions need [subscription.underlying]".into(),
            ));
        }
        if let Some(url) = &self.data.remote_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "data.remote_base_url must be http(s), got '{url}'"
                )));
            }
        }
        Ok(())
    }

    pub fn identity(&self) -> SymbolIdentity {
        let sub = &self.subscription;
        let identity = SymbolIdentity::new(sub.ticker.to_uppercase(), sub.kind, &sub.market, sub.listing_date);
        match &sub.underlying {
            Some(u) => identity.with_underlying(SymbolIdentity::new(
                u.ticker.to_uppercase(),
                u.kind,
                &u.market,
                u.listing_date,
            )),
            None => identity,
        }
    }

    pub fn request(&self) -> SubscriptionRequest {
        let sub = &self.subscription;
        let config = SubscriptionConfig::new(self.identity(), &sub.data_type, sub.resolution);
        let request = SubscriptionRequest::new(config, sub.start, sub.end);
        match &sub.days {
            Some(days) => request.with_days(days.clone()),
            None => request,
        }
    }

    pub fn layout(&self) -> SourceLayout {
        match &self.data.remote_base_url {
            Some(url) => SourceLayout::remote(url, self.data.format),
            None => SourceLayout::local(&self.data.data_root, self.data.format),
        }
    }

    pub fn calendar(&self) -> TradingCalendar {
        TradingCalendar::with_holidays(self.data.holidays.iter().copied())
    }

    pub fn map_file_root(&self) -> PathBuf {
        self.data
            .map_file_root
            .clone()
            .unwrap_or_else(|| self.data.data_root.join("map_files"))
    }

    pub fn map_file_provider(&self) -> LocalMapFileProvider {
        LocalMapFileProvider::new(self.map_file_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceRoot;

    const MINIMAL: &str = r#"
        [subscription]
        ticker = "aapl"
        kind = "equity"
        market = "usa"
        listing_date = "1998-01-02"
        start = "2024-01-02"
        end = "2024-01-31"
    "#;

    #[test]
    fn minimal_file_uses_defaults() {
        let s = Settings::from_toml(MINIMAL).unwrap();
        assert_eq!(s.data.data_root, PathBuf::from("data"));
        assert_eq!(s.data.format, FileFormat::Csv);
        assert_eq!(s.data.log_level, "info");
        assert_eq!(s.map_file_root(), PathBuf::from("data/map_files"));

        let req = s.request();
        assert_eq!(req.config.mapped_symbol, "AAPL");
        assert_eq!(req.config.data_type, "trade_bar");
        assert_eq!(req.config.resolution, Resolution::Minute);
        assert!(req.days.is_none());
    }

    #[test]
    fn remote_base_url_selects_remote_layout() {
        let toml = format!(
            "[data]\nremote_base_url = \"https://data.example.com/\"\nformat = \"parquet\"\n{MINIMAL}"
        );
        let s = Settings::from_toml(&toml).unwrap();
        let layout = s.layout();
        assert!(matches!(layout.root, SourceRoot::Remote(_)));
        assert_eq!(layout.format, FileFormat::Parquet);
    }

    #[test]
    fn start_after_end_is_invalid() {
        let toml = MINIMAL.replace("2024-01-31", "2023-12-01");
        assert!(matches!(Settings::from_toml(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn option_without_underlying_is_invalid() {
        let toml = MINIMAL.replace("\"equity\"", "\"option\"");
        assert!(matches!(Settings::from_toml(&toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_field_is_parse_error() {
        let toml = format!("{MINIMAL}\nsymbol = \"X\"\n");
        assert!(matches!(Settings::from_toml(&toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Settings::from_file(Path::new("/nonexistent/daystream.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
