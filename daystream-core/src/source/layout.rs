//! Directory/URL layout of per-day files.
//!
//! Layout: `{root}/{kind}/{market}/{resolution}/{symbol}/{yyyymmdd}_{suffix}.{ext}`
//! with every path component lower-cased. `root` is either a local directory
//! or a base URL.

use chrono::NaiveDate;
use std::path::PathBuf;

use super::descriptor::{FileFormat, SourceDescriptor, SourceTransport};
use crate::domain::SubscriptionConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRoot {
    Local(PathBuf),
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub root: SourceRoot,
    pub format: FileFormat,
}

impl SourceLayout {
    pub fn local(root: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            root: SourceRoot::Local(root.into()),
            format,
        }
    }

    pub fn remote(base_url: impl Into<String>, format: FileFormat) -> Self {
        Self {
            root: SourceRoot::Remote(base_url.into()),
            format,
        }
    }

    /// Relative components for one day, shared by both roots.
    fn components(
        &self,
        config: &SubscriptionConfig,
        symbol: &str,
        date: NaiveDate,
        suffix: &str,
    ) -> [String; 5] {
        [
            config.identity.kind.as_str().to_string(),
            config.identity.market.to_lowercase(),
            config.resolution.as_str().to_string(),
            symbol.to_lowercase(),
            format!("{}_{suffix}.{}", date.format("%Y%m%d"), self.format.extension()),
        ]
    }

    /// Descriptor for `symbol`'s `suffix` file on `date`.
    pub fn descriptor(
        &self,
        config: &SubscriptionConfig,
        symbol: &str,
        date: NaiveDate,
        suffix: &str,
    ) -> SourceDescriptor {
        let parts = self.components(config, symbol, date, suffix);
        match &self.root {
            SourceRoot::Local(dir) => {
                let path = parts.iter().fold(dir.clone(), |p, c| p.join(c));
                SourceDescriptor::new(
                    path.to_string_lossy().into_owned(),
                    self.format,
                    SourceTransport::LocalFile,
                )
            }
            SourceRoot::Remote(base) => SourceDescriptor::new(
                format!("{}/{}", base.trim_end_matches('/'), parts.join("/")),
                self.format,
                SourceTransport::RemoteFile,
            ),
        }
    }
}
