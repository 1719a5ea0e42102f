//! Readers: turn a source descriptor into a stream of records.
//!
//! The selector picks a reader from the descriptor's format and transport
//! only; the symbol never influences the choice.

pub mod csv_reader;
pub mod parquet_reader;
pub mod row;

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::domain::{Record, SubscriptionConfig};
use crate::error::EnumerationError;
use crate::fetch::FileAccess;
use crate::source::{FileFormat, SourceDescriptor, SourceTransport};

pub use csv_reader::CsvReader;
pub use parquet_reader::ParquetDayReader;
pub use row::{RowContext, RowKind};

/// Records of one day, produced on demand.
pub type RecordStream = Box<dyn Iterator<Item = Result<Record, EnumerationError>>>;

pub trait SourceReader {
    fn read(self: Box<Self>, descriptor: &SourceDescriptor) -> Result<RecordStream, EnumerationError>;
}

pub trait ReaderSelector: Send + Sync {
    fn select<'a>(
        &self,
        descriptor: &SourceDescriptor,
        file_access: &'a dyn FileAccess,
        config: &SubscriptionConfig,
        date: NaiveDate,
        is_live: bool,
    ) -> Result<Box<dyn SourceReader + 'a>, EnumerationError>;
}

/// CSV and Parquet over local or remote transport.
#[derive(Debug, Clone, Default)]
pub struct DefaultReaderSelector {
    disabled: HashSet<(FileFormat, SourceTransport)>,
}

impl DefaultReaderSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse a format/transport pair, e.g. remote files in an offline run.
    pub fn disable(mut self, format: FileFormat, transport: SourceTransport) -> Self {
        self.disabled.insert((format, transport));
        self
    }

    pub fn supports(&self, format: FileFormat, transport: SourceTransport) -> bool {
        !self.disabled.contains(&(format, transport))
    }
}

impl ReaderSelector for DefaultReaderSelector {
    fn select<'a>(
        &self,
        descriptor: &SourceDescriptor,
        file_access: &'a dyn FileAccess,
        config: &SubscriptionConfig,
        date: NaiveDate,
        _is_live: bool,
    ) -> Result<Box<dyn SourceReader + 'a>, EnumerationError> {
        if !self.supports(descriptor.format, descriptor.transport) {
            return Err(EnumerationError::UnsupportedSource {
                format: descriptor.format,
                transport: descriptor.transport,
            });
        }

        let kind = RowKind::for_data_type(&config.data_type).ok_or_else(|| {
            EnumerationError::read(
                &descriptor.location,
                format!("no row layout for data type '{}'", config.data_type),
            )
        })?;
        let context = RowContext {
            kind,
            symbol: config.mapped_symbol.clone(),
            date,
        };

        Ok(match descriptor.format {
            FileFormat::Csv => Box::new(CsvReader::new(file_access, context)),
            FileFormat::Parquet => Box::new(ParquetDayReader::new(file_access, context)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Resolution, SecurityKind, SymbolIdentity};
    use crate::fetch::LocalFileAccess;

    fn config(data_type: &str) -> SubscriptionConfig {
        let identity = SymbolIdentity::new(
            "SPY",
            SecurityKind::Equity,
            "usa",
            NaiveDate::from_ymd_opt(1993, 1, 29).unwrap(),
        );
        SubscriptionConfig::new(identity, data_type, Resolution::Minute)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn disabled_pair_is_unsupported() {
        let selector = DefaultReaderSelector::new().disable(FileFormat::Parquet, SourceTransport::RemoteFile);
        let d = SourceDescriptor::new("http://h/x.parquet", FileFormat::Parquet, SourceTransport::RemoteFile);

        match selector.select(&d, &LocalFileAccess, &config("trade_bar"), day(), false) {
            Err(EnumerationError::UnsupportedSource { format, transport }) => {
                assert_eq!(format, FileFormat::Parquet);
                assert_eq!(transport, SourceTransport::RemoteFile);
            }
            Err(other) => panic!("expected UnsupportedSource, got {other:?}"),
            Ok(_) => panic!("expected UnsupportedSource"),
        }
    }

    #[test]
    fn every_builtin_pair_is_supported_by_default() {
        let selector = DefaultReaderSelector::new();
        for format in [FileFormat::Csv, FileFormat::Parquet] {
            for transport in [SourceTransport::LocalFile, SourceTransport::RemoteFile] {
                let d = SourceDescriptor::new("x", format, transport);
                assert!(selector
                    .select(&d, &LocalFileAccess, &config("tick"), day(), false)
                    .is_ok());
            }
        }
    }

    #[test]
    fn unknown_data_type_has_no_reader() {
        let selector = DefaultReaderSelector::new();
        let d = SourceDescriptor::new("x.csv", FileFormat::Csv, SourceTransport::LocalFile);
        assert!(selector
            .select(&d, &LocalFileAccess, &config("open_interest"), day(), false)
            .is_err());
    }
}
