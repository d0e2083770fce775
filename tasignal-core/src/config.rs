//! Engine configuration: indicator parameters plus scoring rules.
//!
//! Everything is plain serde data with defaults, so an empty TOML document
//! yields the standard setup:
//!
//! ```toml
//! [indicators.dmi]
//! period = 14
//!
//! [indicators.regime]
//! trending = 25.0
//!
//! [scoring.weights]
//! ma_alignment = 2.0
//! regime_trending = 1.5
//!
//! [scoring.thresholds]
//! strong = 0.65
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::indicators::{
    Bollinger, Dmi, Donchian, Macd, MovingAverages, ParabolicSar, RegimeThresholds, Rsi,
    Stochastic, VolumeContext,
};
use crate::scoring::ScoringConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config: {0}")]
    Parse(String),

    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("weight for {signal} must be finite and >= 0, got {weight}")]
    NegativeWeight { signal: String, weight: f64 },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn require_period(field: &str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(invalid(field, format!("must be >= {min}, got {value}")));
    }
    Ok(())
}

fn require_zones(field: &str, overbought: f64, oversold: f64) -> Result<(), ConfigError> {
    if !(oversold.is_finite() && overbought.is_finite() && oversold < overbought) {
        return Err(invalid(
            field,
            format!("oversold ({oversold}) must be below overbought ({overbought})"),
        ));
    }
    Ok(())
}

/// Parameters of every indicator in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub dmi: Dmi,
    pub regime: RegimeThresholds,
    pub sar: ParabolicSar,
    pub moving_averages: MovingAverages,
    pub bollinger: Bollinger,
    pub donchian: Donchian,
    pub rsi: Rsi,
    pub macd: Macd,
    pub stochastic: Stochastic,
    pub volume: VolumeContext,
}

impl IndicatorParams {
    /// Reject parameter sets the indicators cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_period("dmi.period", self.dmi.period, 1)?;

        if !self.regime.is_ordered() {
            return Err(invalid(
                "regime",
                "thresholds must satisfy weak_trend <= trending <= exhaustion",
            ));
        }

        let sar = &self.sar;
        if !(sar.af_start > 0.0 && sar.af_step > 0.0 && sar.af_max >= sar.af_start) {
            return Err(invalid(
                "sar",
                "need af_start > 0, af_step > 0 and af_max >= af_start",
            ));
        }

        let [fast, short, medium, long] = self.moving_averages.periods();
        require_period("moving_averages.fast", fast, 1)?;
        if !(fast < short && short < medium && medium < long) {
            return Err(invalid(
                "moving_averages",
                format!("periods must be strictly increasing, got {fast}/{short}/{medium}/{long}"),
            ));
        }

        require_period("bollinger.period", self.bollinger.period, 2)?;
        require_period("bollinger.squeeze_lookback", self.bollinger.squeeze_lookback, 1)?;
        if !(self.bollinger.multiplier > 0.0 && self.bollinger.multiplier.is_finite()) {
            return Err(invalid("bollinger.multiplier", "must be a positive number"));
        }

        require_period("donchian.period", self.donchian.period, 1)?;

        require_period("rsi.period", self.rsi.period, 1)?;
        require_zones("rsi", self.rsi.overbought, self.rsi.oversold)?;

        require_period("macd.fast", self.macd.fast, 1)?;
        require_period("macd.signal", self.macd.signal, 1)?;
        if self.macd.fast >= self.macd.slow {
            return Err(invalid("macd", "fast period must be below the slow period"));
        }

        let st = &self.stochastic;
        require_period("stochastic.k_period", st.k_period, 1)?;
        require_period("stochastic.smooth", st.smooth, 1)?;
        require_period("stochastic.d_period", st.d_period, 1)?;
        require_zones("stochastic", st.overbought, st.oversold)?;

        require_period("volume.obv_ema_period", self.volume.obv_ema_period, 1)?;
        require_period("volume.sma_period", self.volume.sma_period, 1)?;
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub indicators: IndicatorParams,
    pub scoring: ScoringConfig,
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.scoring.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Signal;

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.indicators.dmi.period, 14);
        assert_eq!(config.scoring.weights.total(), 18.0);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = EngineConfig::default();
        config.scoring.weights.set(Signal::MaAlignment, 2.5);
        config.scoring.thresholds.strong = 0.7;
        config.indicators.rsi.period = 21;

        let text = config.to_toml().unwrap();
        let back = EngineConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [indicators.bollinger]
            squeeze_lookback = 60

            [scoring.thresholds]
            watch = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.indicators.bollinger.squeeze_lookback, 60);
        assert_eq!(config.indicators.bollinger.period, 20);
        assert_eq!(config.scoring.thresholds.watch, 0.3);
        assert_eq!(config.scoring.thresholds.medium, 0.40);
    }

    #[test]
    fn unknown_signal_is_rejected() {
        let err = EngineConfig::from_toml("[scoring.weights]\nmoon_phase = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = EngineConfig::from_toml("[scoring.weights]\nbb_squeeze = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::NegativeWeight { ref signal, .. } if signal == "bb_squeeze"));
    }

    #[test]
    fn zero_period_is_rejected() {
        let err = EngineConfig::from_toml("[indicators.dmi]\nperiod = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "dmi.period"));
    }

    #[test]
    fn unordered_ema_stack_is_rejected() {
        let mut params = IndicatorParams::default();
        params.moving_averages.medium = 300;
        assert!(params.validate().is_err());
    }

    #[test]
    fn inverted_zones_are_rejected() {
        let mut params = IndicatorParams::default();
        params.rsi.oversold = 80.0;
        let err = params.validate().unwrap_err();
        assert!(err.to_string().starts_with("invalid rsi"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/tasignal.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tasignal.toml"));
    }
}
