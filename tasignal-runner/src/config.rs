//! Runner configuration and ticker lists.
//!
//! ```toml
//! data_dir = "data/prices"
//! tickers_file = "tickers.txt"
//! source = "csv"
//! parallel = true
//!
//! [synthetic]
//! start = "2023-01-02"
//! end = "2024-12-31"
//!
//! [scoring.weights]
//! ma_alignment = 1.5
//!
//! [indicators.rsi]
//! period = 14
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tasignal_core::config::{ConfigError, EngineConfig, IndicatorParams};
use tasignal_core::scoring::ScoringConfig;

/// Where the runner reads bars from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `{data_dir}/{SYMBOL}_daily.csv`
    #[default]
    Csv,
    /// `{data_dir}/{SYMBOL}.parquet`
    Parquet,
    /// Deterministic random walk per symbol.
    Synthetic,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Csv => "csv",
            SourceKind::Parquet => "parquet",
            SourceKind::Synthetic => "synthetic",
        };
        f.write_str(s)
    }
}

/// Date range for synthetic bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for SyntheticRange {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }
}

/// Everything a batch run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub data_dir: PathBuf,
    pub tickers_file: PathBuf,
    pub source: SourceKind,
    /// Score instruments on the rayon pool instead of one by one.
    pub parallel: bool,
    pub synthetic: SyntheticRange,
    pub scoring: ScoringConfig,
    pub indicators: IndicatorParams,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/prices"),
            tickers_file: PathBuf::from("tickers.txt"),
            source: SourceKind::default(),
            parallel: true,
            synthetic: SyntheticRange::default(),
            scoring: ScoringConfig::default(),
            indicators: IndicatorParams::default(),
        }
    }
}

impl RunnerConfig {
    /// Load a runner config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a runner config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.engine_config().validate()?;
        if config.synthetic.start > config.synthetic.end {
            return Err(ConfigError::Invalid {
                field: "synthetic".into(),
                reason: format!(
                    "start {} is after end {}",
                    config.synthetic.start, config.synthetic.end
                ),
            });
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Engine part of the config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            indicators: self.indicators,
            scoring: self.scoring.clone(),
        }
    }
}

/// Parse a ticker list: one symbol per line, `#` starts a comment, blank
/// lines are skipped, symbols are upper-cased and deduplicated in order.
pub fn parse_tickers(content: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for line in content.lines() {
        let symbol = line.split('#').next().unwrap_or("").trim().to_uppercase();
        if !symbol.is_empty() && !tickers.contains(&symbol) {
            tickers.push(symbol);
        }
    }
    tickers
}

/// Load a ticker list file.
pub fn load_tickers(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let tickers = parse_tickers(&content);
    if tickers.is_empty() {
        return Err(ConfigError::Invalid {
            field: "tickers_file".into(),
            reason: format!("no symbols in {}", path.display()),
        });
    }
    Ok(tickers)
}
