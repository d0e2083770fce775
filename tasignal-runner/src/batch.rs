//! Batch scoring across a ticker list.
//!
//! Each symbol is loaded from the configured `PriceSource` and scored by a
//! shared `SignalEngine`. Symbols are independent, so the batch fans out on
//! the rayon pool when `parallel` is set. Output order always follows the
//! input order. A symbol that fails to load or score becomes a
//! `BatchFailure` and never aborts the batch.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tasignal_core::data::{DataSource, PriceSource, SourceError};
use tasignal_core::frame::FrameError;
use tasignal_core::scoring::SignalTier;
use tasignal_core::{ScoreResult, SignalEngine};
use thiserror::Error;
use tracing::{info, warn};

use crate::data_loader::{dataset_hash, is_up_to_date};

/// Persisted report format version.
pub const SCHEMA_VERSION: u32 = 1;

/// Why a single symbol could not be scored.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{symbol}: {source}")]
    Frame {
        symbol: String,
        #[source]
        source: FrameError,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub parallel: bool,
    /// Reference date for the staleness check; `None` skips it.
    pub today: Option<NaiveDate>,
}

/// One scored symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub result: ScoreResult,
    pub source: DataSource,
    pub data_hash: String,
    pub bars: usize,
    /// Last bar older than the previous weekday.
    #[serde(default)]
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub symbol: String,
    pub reason: String,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub schema_version: u32,
    /// Hash over every scored symbol's data hash, in input order.
    pub dataset_hash: String,
    pub entries: Vec<BatchEntry>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Entries with the given tier, in input order.
    pub fn with_tier(&self, tier: SignalTier) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(move |e| e.result.signal == tier)
    }

    /// Any result computed on synthetic bars.
    pub fn has_synthetic(&self) -> bool {
        self.entries.iter().any(|e| e.source == DataSource::Synthetic)
    }
}

/// Load and score one symbol.
pub fn score_symbol(
    engine: &SignalEngine,
    source: &dyn PriceSource,
    symbol: &str,
    today: Option<NaiveDate>,
) -> Result<BatchEntry, ScoreError> {
    let loaded = source.load(symbol)?;
    let data_hash = dataset_hash(&loaded.bars);
    let bars = loaded.bars.len();
    let stale = match (today, loaded.bars.last()) {
        (Some(today), Some(last)) => !is_up_to_date(last.date, today),
        _ => false,
    };
    let result = engine
        .score(loaded.instrument, loaded.bars)
        .map_err(|e| ScoreError::Frame {
            symbol: symbol.to_string(),
            source: e,
        })?;
    Ok(BatchEntry {
        result,
        source: loaded.source,
        data_hash,
        bars,
        stale,
    })
}

/// Score every symbol and collect the outcomes.
pub fn run_batch(
    engine: &SignalEngine,
    source: &dyn PriceSource,
    symbols: &[String],
    opts: BatchOptions,
) -> BatchReport {
    info!(
        symbols = symbols.len(),
        source = source.name(),
        parallel = opts.parallel,
        "starting batch"
    );

    let score = |symbol: &String| (symbol.clone(), score_symbol(engine, source, symbol, opts.today));
    let outcomes: Vec<(String, Result<BatchEntry, ScoreError>)> = if opts.parallel {
        symbols.par_iter().map(score).collect()
    } else {
        symbols.iter().map(score).collect()
    };

    let mut entries = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    let mut hasher = blake3::Hasher::new();
    for (symbol, outcome) in outcomes {
        match outcome {
            Ok(entry) => {
                info!(
                    symbol = %symbol,
                    signal = %entry.result.signal,
                    strength = %entry.result.strength,
                    score = entry.result.score,
                    regime = %entry.result.regime,
                    "scored"
                );
                if entry.stale {
                    warn!(symbol = %symbol, date = %entry.result.date, "data is not up to date");
                }
                hasher.update(symbol.as_bytes());
                hasher.update(entry.data_hash.as_bytes());
                entries.push(entry);
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                failures.push(BatchFailure {
                    symbol,
                    reason: e.to_string(),
                });
            }
        }
    }

    let report = BatchReport {
        schema_version: SCHEMA_VERSION,
        dataset_hash: hasher.finalize().to_hex().to_string(),
        entries,
        failures,
    };
    info!(
        scored = report.entries.len(),
        failed = report.failures.len(),
        buys = report.with_tier(SignalTier::Buy).count(),
        watch = report.with_tier(SignalTier::Watch).count(),
        "batch complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::SyntheticPriceSource;
    use tasignal_core::data::SourcedBars;
    use tasignal_core::domain::{Bar, Instrument};

    fn synthetic() -> SyntheticPriceSource {
        SyntheticPriceSource::new(
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
        )
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Serves unsorted bars for "BAD" and nothing for anything else.
    struct BrokenSource;

    impl PriceSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn load(&self, symbol: &str) -> Result<SourcedBars, SourceError> {
            if symbol != "BAD" {
                return Err(SourceError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            Ok(SourcedBars {
                instrument: Instrument::from_symbol(symbol),
                bars: vec![
                    Bar::new(d(3), 1.0, 1.0, 1.0, 1.0, 1.0),
                    Bar::new(d(2), 1.0, 1.0, 1.0, 1.0, 1.0),
                ],
                source: DataSource::Csv,
            })
        }
    }

    #[test]
    fn batch_keeps_input_order() {
        let engine = SignalEngine::default();
        let list = symbols(&["SPY", "QQQ", "IWM", "DIA"]);
        let report = run_batch(
            &engine,
            &synthetic(),
            &list,
            BatchOptions {
                parallel: true,
                today: None,
            },
        );
        let order: Vec<&str> = report
            .entries
            .iter()
            .map(|e| e.result.instrument.symbol.as_str())
            .collect();
        assert_eq!(order, vec!["SPY", "QQQ", "IWM", "DIA"]);
        assert!(report.failures.is_empty());
        assert!(report.has_synthetic());
        assert_eq!(report.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let engine = SignalEngine::default();
        let list = symbols(&["AAPL", "MSFT", "NVDA"]);
        let par = run_batch(&engine, &synthetic(), &list, BatchOptions { parallel: true, today: None });
        let seq = run_batch(&engine, &synthetic(), &list, BatchOptions { parallel: false, today: None });
        assert_eq!(par, seq);
    }

    #[test]
    fn failures_do_not_abort_the_batch() {
        let engine = SignalEngine::default();
        let list = symbols(&["MISSING", "BAD"]);
        let report = run_batch(&engine, &BrokenSource, &list, BatchOptions::default());
        assert!(report.entries.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].symbol, "MISSING");
        assert!(report.failures[0].reason.contains("not found"));
        assert!(report.failures[1].reason.contains("BAD"));
    }

    #[test]
    fn staleness_is_flagged() {
        let engine = SignalEngine::default();
        let source = synthetic();
        // Last synthetic bar is Friday 2023-12-29.
        let fresh = score_symbol(&engine, &source, "SPY", NaiveDate::from_ymd_opt(2024, 1, 1)).unwrap();
        assert!(!fresh.stale);
        let old = score_symbol(&engine, &source, "SPY", NaiveDate::from_ymd_opt(2024, 1, 10)).unwrap();
        assert!(old.stale);
        let unchecked = score_symbol(&engine, &source, "SPY", None).unwrap();
        assert!(!unchecked.stale);
    }

    #[test]
    fn dataset_hash_depends_on_symbols() {
        let engine = SignalEngine::default();
        let a = run_batch(&engine, &synthetic(), &symbols(&["SPY"]), BatchOptions::default());
        let b = run_batch(&engine, &synthetic(), &symbols(&["QQQ"]), BatchOptions::default());
        let a2 = run_batch(&engine, &synthetic(), &symbols(&["SPY"]), BatchOptions::default());
        assert_ne!(a.dataset_hash, b.dataset_hash);
        assert_eq!(a.dataset_hash, a2.dataset_hash);
    }
}
