//! Subscription enumeration: stitches per-day sources into one record stream.
//!
//! For every day of the request, in order:
//! 1. resolve the ticker valid on that day (symbol history)
//! 2. ask the data type's locator where the day's data lives
//! 3. select a reader for the descriptor's format/transport
//! 4. yield the day's records before touching the next day
//!
//! All of this happens lazily inside `Iterator::next`. The day's ticker is
//! passed to the locator as an argument; the subscription config is never
//! modified, so readers and callers always see the configured symbol.
//!
//! The first error ends the stream: it is yielded once and every later call
//! returns `None`. A `Read` error on a downloaded file also asks the file
//! access handle to quarantine that download.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::calendar::DaySequence;
use crate::domain::{Record, SubscriptionRequest};
use crate::error::EnumerationError;
use crate::fetch::FileAccess;
use crate::mapping::{SymbolHistoryResolver, SymbolMapper};
use crate::reader::{ReaderSelector, RecordStream};
use crate::source::{LocatorRegistry, SourceDescriptor, SourceLocator, SourceTransport};

/// Sources are always located for historical data.
const IS_LIVE: bool = false;

/// Builds enumerators from shared, read-only collaborators.
pub struct EnumeratorFactory {
    resolver: Arc<SymbolHistoryResolver>,
    registry: LocatorRegistry,
    selector: Box<dyn ReaderSelector>,
    days: Box<dyn DaySequence>,
}

impl EnumeratorFactory {
    pub fn new(
        resolver: Arc<SymbolHistoryResolver>,
        registry: LocatorRegistry,
        selector: impl ReaderSelector + 'static,
        days: impl DaySequence + 'static,
    ) -> Self {
        Self {
            resolver,
            registry,
            selector: Box::new(selector),
            days: Box::new(days),
        }
    }

    pub fn resolver(&self) -> &SymbolHistoryResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    /// Create the lazy record stream for `request`.
    ///
    /// Fails with [`EnumerationError::Construction`] if the request's data type
    /// has no registered locator. No day is processed before the first `next`.
    pub fn create_enumerator<'a>(
        &'a self,
        request: &'a SubscriptionRequest,
        file_access: &'a dyn FileAccess,
    ) -> Result<SubscriptionEnumerator<'a>, EnumerationError> {
        let locator = self.registry.create(&request.config.data_type)?;
        tracing::debug!(
            symbol = %request.config.mapped_symbol,
            data_type = %request.config.data_type,
            resolution = %request.config.resolution,
            start = %request.start,
            end = %request.end,
            "created subscription enumerator"
        );

        Ok(SubscriptionEnumerator {
            factory: self,
            request,
            file_access,
            locator,
            mapper: None,
            days: self.days.days(request),
            current: None,
            source: None,
            finished: false,
            days_opened: 0,
            records_emitted: 0,
        })
    }
}

/// Forward-only stream of one subscription's records.
pub struct SubscriptionEnumerator<'a> {
    factory: &'a EnumeratorFactory,
    request: &'a SubscriptionRequest,
    file_access: &'a dyn FileAccess,
    locator: Box<dyn SourceLocator>,
    /// Built on the first day and reused for the rest of the stream.
    mapper: Option<SymbolMapper>,
    days: Box<dyn Iterator<Item = NaiveDate> + 'a>,
    current: Option<RecordStream>,
    /// Descriptor handed to the current day's reader.
    source: Option<SourceDescriptor>,
    finished: bool,
    days_opened: usize,
    records_emitted: usize,
}

impl<'a> SubscriptionEnumerator<'a> {
    pub fn days_opened(&self) -> usize {
        self.days_opened
    }

    pub fn records_emitted(&self) -> usize {
        self.records_emitted
    }

    /// Resolve, locate, select and open the reader for `date`.
    fn open_day(&mut self, date: NaiveDate) -> Result<RecordStream, EnumerationError> {
        let request = self.request;
        let config = &request.config;
        self.source = None;

        let mapper = match self.mapper.take() {
            Some(mapper) => mapper,
            None => self.factory.resolver.mapper_for(config)?,
        };
        let resolved = mapper.resolve(config, date);
        self.mapper = Some(mapper);
        let mapped_symbol = resolved?;

        let descriptor = self.locator.get_source(config, &mapped_symbol, date, IS_LIVE)?;
        tracing::debug!(%date, %mapped_symbol, source = %descriptor, "opening day");

        let reader = self
            .factory
            .selector
            .select(&descriptor, self.file_access, config, date, IS_LIVE)?;
        let stream = reader.read(&descriptor);
        self.source = Some(descriptor);
        let stream = stream?;
        self.days_opened += 1;
        Ok(stream)
    }

    fn fail(&mut self, error: EnumerationError) -> EnumerationError {
        tracing::warn!(
            symbol = %self.request.config.mapped_symbol,
            days = self.days_opened,
            records = self.records_emitted,
            %error,
            "subscription enumeration failed"
        );
        if let (EnumerationError::Read { .. }, Some(source)) = (&error, &self.source) {
            if source.transport == SourceTransport::RemoteFile {
                self.file_access.quarantine(source, &error);
            }
        }
        self.finished = true;
        self.current = None;
        error
    }

    fn finish(&mut self) {
        self.finished = true;
        tracing::info!(
            symbol = %self.request.config.mapped_symbol,
            days = self.days_opened,
            records = self.records_emitted,
            "subscription enumeration complete"
        );
    }
}

impl<'a> Iterator for SubscriptionEnumerator<'a> {
    type Item = Result<Record, EnumerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(stream) = self.current.as_mut() {
                match stream.next() {
                    Some(Ok(record)) => {
                        self.records_emitted += 1;
                        return Some(Ok(record));
                    }
                    Some(Err(e)) => return Some(Err(self.fail(e))),
                    None => self.current = None,
                }
            }

            let Some(date) = self.days.next() else {
                self.finish();
                return None;
            };

            match self.open_day(date) {
                Ok(stream) => self.current = Some(stream),
                Err(e) => return Some(Err(self.fail(e))),
            }
        }
    }
}

impl<'a> std::iter::FusedIterator for SubscriptionEnumerator<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::TradingCalendar;
    use crate::domain::{Resolution, SecurityKind, SubscriptionConfig, SymbolIdentity};
    use crate::fetch::LocalFileAccess;
    use crate::mapping::{InMemoryMapFileProvider, MapFileRow};
    use crate::reader::DefaultReaderSelector;
    use crate::source::{FileFormat, SourceLayout};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn factory(root: &std::path::Path) -> EnumeratorFactory {
        let provider = InMemoryMapFileProvider::new().with_rows(
            "usa",
            "META",
            vec![
                MapFileRow::new(date(2012, 5, 18), "FB"),
                MapFileRow::new(date(2022, 6, 9), "META"),
            ],
        );
        EnumeratorFactory::new(
            Arc::new(SymbolHistoryResolver::new(provider)),
            LocatorRegistry::with_defaults(SourceLayout::local(root, FileFormat::Csv)),
            DefaultReaderSelector::new(),
            TradingCalendar::new(),
        )
    }

    fn request(data_type: &str) -> SubscriptionRequest {
        let identity = SymbolIdentity::new("META", SecurityKind::Equity, "usa", date(2012, 5, 18));
        SubscriptionRequest::new(
            SubscriptionConfig::new(identity, data_type, Resolution::Minute),
            date(2022, 6, 8),
            date(2022, 6, 9),
        )
    }

    fn write_day(root: &std::path::Path, symbol: &str, day: &str, rows: &str) {
        let dir = root.join("equity/usa/minute").join(symbol);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{day}_trade.csv")), rows).unwrap();
    }

    #[test]
    fn reads_files_under_the_ticker_valid_each_day() {
        let dir = tempfile::tempdir().unwrap();
        write_day(dir.path(), "fb", "20220608", "34200000,1,1,1,1,10\n");
        write_day(dir.path(), "meta", "20220609", "34200000,2,2,2,2,20\n");

        let factory = factory(dir.path());
        let req = request("trade_bar");
        let records: Vec<Record> = factory
            .create_enumerator(&req, &LocalFileAccess)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        // labels follow the configured symbol, not the day's ticker
        assert!(records.iter().all(|r| r.symbol() == "META"));
        assert_eq!(req.config.mapped_symbol, "META");
    }

    #[test]
    fn unknown_data_type_fails_before_any_day() {
        let dir = tempfile::tempdir().unwrap();
        let factory = factory(dir.path());
        let req = request("open_interest");

        assert!(matches!(
            factory.create_enumerator(&req, &LocalFileAccess),
            Err(EnumerationError::Construction(_))
        ));
    }

    #[test]
    fn missing_day_file_ends_stream() {
        let dir = tempfile::tempdir().unwrap();
        write_day(dir.path(), "fb", "20220608", "34200000,1,1,1,1,10\n");

        let factory = factory(dir.path());
        let req = request("trade_bar");
        let mut stream = factory.create_enumerator(&req, &LocalFileAccess).unwrap();

        assert!(stream.next().unwrap().is_ok());
        assert!(matches!(
            stream.next(),
            Some(Err(EnumerationError::SourceNotFound { .. }))
        ));
        assert!(stream.next().is_none());
        assert_eq!(stream.days_opened(), 1);
    }
}
