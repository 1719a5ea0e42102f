//! daystream CLI: enumerate subscriptions and inspect their inputs.
//!
//! Commands:
//! - `stream` enumerates the subscription in a settings file as JSON lines
//! - `map` prints the ticker an equity traded under on a date
//! - `days` prints the tradable days of a range

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use daystream_core::calendar::TradingCalendar;
use daystream_core::domain::{Resolution, SecurityKind, SubscriptionConfig, SymbolIdentity};
use daystream_core::fetch::{CircuitBreaker, FileAccess, HttpFileAccess, LocalFileAccess};
use daystream_core::mapping::{LocalMapFileProvider, SymbolHistoryResolver};
use daystream_core::reader::DefaultReaderSelector;
use daystream_core::settings::Settings;
use daystream_core::source::{FileFormat, LocatorRegistry, SourceTransport};
use daystream_core::EnumeratorFactory;

#[derive(Parser)]
#[command(
    name = "daystream",
    version,
    about = "Stream per-day market data files as one continuous record sequence"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate the subscription in a settings file and print records as JSON lines.
    Stream {
        /// Path to the TOML settings file.
        #[arg(long)]
        config: PathBuf,

        /// Stop after this many records.
        #[arg(long)]
        limit: Option<usize>,

        /// Never download: remote sources fail instead.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Print the ticker an equity traded under on a date.
    Map {
        /// Ticker as it trades today.
        #[arg(long)]
        ticker: String,

        #[arg(long, default_value = "usa")]
        market: String,

        /// Date to resolve (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,

        /// Directory holding `{market}/{ticker}.csv` (and `{ticker}@{label}.csv`) map files.
        #[arg(long, default_value = "data/map_files")]
        map_root: PathBuf,

        /// Listing date of the identity. Defaults to the queried date.
        #[arg(long)]
        listed: Option<NaiveDate>,
    },
    /// Print the tradable days between two dates.
    Days {
        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        /// Include weekends.
        #[arg(long, default_value_t = false)]
        crypto: bool,

        /// Holiday to skip (YYYY-MM-DD). Repeatable.
        #[arg(long = "holiday")]
        holidays: Vec<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stream {
            config,
            limit,
            offline,
        } => run_stream(config, limit, offline),
        Commands::Map {
            ticker,
            market,
            date,
            map_root,
            listed,
        } => {
            init_logging("info");
            run_map(&ticker, &market, date, map_root, listed)
        }
        Commands::Days {
            start,
            end,
            crypto,
            holidays,
        } => {
            init_logging("info");
            run_days(start, end, crypto, holidays)
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides `default_level`.
fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_stream(config: PathBuf, limit: Option<usize>, offline: bool) -> Result<()> {
    let settings = Settings::from_file(&config)?;
    init_logging(&settings.data.log_level);

    let mut selector = DefaultReaderSelector::new();
    let access: Box<dyn FileAccess> = match &settings.data.remote_base_url {
        Some(_) if offline => {
            for format in [FileFormat::Csv, FileFormat::Parquet] {
                selector = selector.disable(format, SourceTransport::RemoteFile);
            }
            Box::new(LocalFileAccess)
        }
        Some(_) => Box::new(HttpFileAccess::new(
            &settings.data.cache_dir,
            Arc::new(CircuitBreaker::default_remote()),
        )?),
        None => Box::new(LocalFileAccess),
    };

    let factory = EnumeratorFactory::new(
        Arc::new(SymbolHistoryResolver::new(settings.map_file_provider())),
        LocatorRegistry::with_defaults(settings.layout()),
        selector,
        settings.calendar(),
    );
    let request = settings.request();
    let enumerator = factory.create_enumerator(&request, access.as_ref())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0usize;
    for record in enumerator.take(limit.unwrap_or(usize::MAX)) {
        let record = record.with_context(|| format!("after {written} records"))?;
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;

    if limit == Some(written) {
        tracing::info!(records = written, "stopped at --limit");
    }
    Ok(())
}

fn run_map(
    ticker: &str,
    market: &str,
    date: NaiveDate,
    map_root: PathBuf,
    listed: Option<NaiveDate>,
) -> Result<()> {
    if ticker.trim().is_empty() {
        bail!("--ticker must not be empty");
    }

    let identity = SymbolIdentity::new(
        ticker.to_uppercase(),
        SecurityKind::Equity,
        market,
        listed.unwrap_or(date),
    );
    let resolver = SymbolHistoryResolver::new(LocalMapFileProvider::new(map_root));
    let config = SubscriptionConfig::new(identity, "trade_bar", Resolution::Daily);

    let symbol = resolver.resolve_mapped_symbol(&config, date)?;
    println!("{symbol}");
    Ok(())
}

fn run_days(start: NaiveDate, end: NaiveDate, crypto: bool, holidays: Vec<NaiveDate>) -> Result<()> {
    if start > end {
        bail!("--start {start} is after --end {end}");
    }

    let calendar = TradingCalendar::with_holidays(holidays);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut count = 0usize;
    for day in calendar.tradable_days(start, end, crypto) {
        writeln!(out, "{day}")?;
        count += 1;
    }
    out.flush()?;

    tracing::debug!(count, "tradable days");
    Ok(())
}
