//! Price source trait and structured error types.
//!
//! The engine never fetches data itself. `PriceSource` abstracts over where
//! daily bars come from (CSV export, Parquet store, synthetic generator) so
//! sources can be swapped and mocked in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::{Bar, Instrument};
use crate::frame::FrameError;

/// Structured error types for price loading.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("malformed price data for {symbol}: {source}")]
    Malformed {
        symbol: String,
        #[source]
        source: FrameError,
    },

    #[error("source error: {0}")]
    Other(String),
}

/// Where a bar series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Parquet,
    Synthetic,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataSource::Csv => "csv",
            DataSource::Parquet => "parquet",
            DataSource::Synthetic => "synthetic",
        };
        f.write_str(s)
    }
}

/// Bars for one instrument plus provenance.
#[derive(Debug, Clone)]
pub struct SourcedBars {
    pub instrument: Instrument,
    pub bars: Vec<Bar>,
    pub source: DataSource,
}

/// Trait for price sources.
///
/// Implementations return bars in ascending date order; the pipeline still
/// validates ordering and rejects anything else.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Load the full daily history for a symbol.
    fn load(&self, symbol: &str) -> Result<SourcedBars, SourceError>;
}
