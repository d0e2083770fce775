//! Price sources for the runner.
//!
//! Three implementations of the core `PriceSource` trait:
//! 1. `CsvPriceSource`: vendor CSV exports at `{data_dir}/{SYMBOL}_daily.csv`
//! 2. `ParquetPriceSource`: columnar store at `{data_dir}/{SYMBOL}.parquet`
//! 3. `SyntheticPriceSource`: deterministic random walk per symbol
//!
//! Synthetic data is a developer-only mode. Results produced on it are
//! tagged with `DataSource::Synthetic`.

use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tasignal_core::data::{bars_from_dataframe, DataSource, PriceSource, SourceError, SourcedBars};
use tasignal_core::domain::{Bar, Instrument};
use thiserror::Error;
use tracing::debug;

use crate::config::{RunnerConfig, SourceKind};

/// Errors opening a price source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory {path} does not exist")]
    MissingDataDir { path: String },
}

/// Open the source selected by the runner config.
pub fn open_source(config: &RunnerConfig) -> Result<Box<dyn PriceSource>, LoadError> {
    let require_dir = |dir: &Path| {
        if dir.is_dir() {
            Ok(())
        } else {
            Err(LoadError::MissingDataDir {
                path: dir.display().to_string(),
            })
        }
    };
    match config.source {
        SourceKind::Csv => {
            require_dir(&config.data_dir)?;
            Ok(Box::new(CsvPriceSource::new(&config.data_dir)))
        }
        SourceKind::Parquet => {
            require_dir(&config.data_dir)?;
            Ok(Box::new(ParquetPriceSource::new(&config.data_dir)))
        }
        SourceKind::Synthetic => Ok(Box::new(SyntheticPriceSource::new(
            config.synthetic.start,
            config.synthetic.end,
        ))),
    }
}

fn into_sourced(symbol: &str, df: &DataFrame, source: DataSource) -> Result<SourcedBars, SourceError> {
    let bars = bars_from_dataframe(df).map_err(|e| SourceError::Malformed {
        symbol: symbol.to_string(),
        source: e,
    })?;
    debug!(symbol, bars = bars.len(), %source, "loaded bars");
    Ok(SourcedBars {
        instrument: Instrument::from_symbol(symbol),
        bars,
        source,
    })
}

fn io_error(path: &Path, e: impl ToString) -> SourceError {
    SourceError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Daily bars from `{data_dir}/{SYMBOL}_daily.csv`.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    data_dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}_daily.csv", symbol.to_uppercase()))
    }
}

impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self, symbol: &str) -> Result<SourcedBars, SourceError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(SourceError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let df = LazyCsvReader::new(&path)
            .with_has_header(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| io_error(&path, e))?;
        into_sourced(symbol, &df, DataSource::Csv)
    }
}

// ─── Parquet ────────────────────────────────────────────────────────

/// Daily bars from `{data_dir}/{SYMBOL}.parquet`.
#[derive(Debug, Clone)]
pub struct ParquetPriceSource {
    data_dir: PathBuf,
}

impl ParquetPriceSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.parquet", symbol.to_uppercase()))
    }
}

impl PriceSource for ParquetPriceSource {
    fn name(&self) -> &str {
        "parquet"
    }

    fn load(&self, symbol: &str) -> Result<SourcedBars, SourceError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(SourceError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let file = fs::File::open(&path).map_err(|e| io_error(&path, e))?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| io_error(&path, e))?;
        into_sourced(symbol, &df, DataSource::Parquet)
    }
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Deterministic random-walk bars, seeded from the symbol name.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticPriceSource {
    start: NaiveDate,
    end: NaiveDate,
}

impl SyntheticPriceSource {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

impl PriceSource for SyntheticPriceSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(&self, symbol: &str) -> Result<SourcedBars, SourceError> {
        let bars = generate_synthetic_bars(symbol, self.start, self.end);
        if bars.is_empty() {
            return Err(SourceError::Other(format!(
                "no weekdays between {} and {}",
                self.start, self.end
            )));
        }
        Ok(SourcedBars {
            instrument: Instrument::from_symbol(symbol),
            bars,
            source: DataSource::Synthetic,
        })
    }
}

/// Generate synthetic weekday bars: a random walk from 100.0.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.to_uppercase().as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if is_weekday(current) {
            let daily_return: f64 = rng.gen_range(-0.025..0.027);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64) as f64;
            bars.push(Bar::new(current, open, high, low, close, volume));
            price = close;
        }
        current += chrono::Duration::days(1);
    }

    bars
}

// ─── Hashing and staleness ──────────────────────────────────────────

/// BLAKE3 hash over dates and OHLCV values, as hex.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The last weekday strictly before `date`.
pub fn previous_weekday(date: NaiveDate) -> NaiveDate {
    let mut day = date - chrono::Duration::days(1);
    while !is_weekday(day) {
        day -= chrono::Duration::days(1);
    }
    day
}

/// Data is current when its last bar is no older than the previous weekday.
pub fn is_up_to_date(last_date: NaiveDate, today: NaiveDate) -> bool {
    last_date >= previous_weekday(today)
}
