//! tasignal core: indicator recurrences, regime classification, composite scoring.
//!
//! This crate turns a daily OHLCV series for one instrument into a single
//! BUY / WATCH / NEUTRAL decision:
//! - Domain types (bars, instruments)
//! - Smoothing primitives as pure folds (Wilder sum, Wilder mean, EMA)
//! - ADX/DMI with regime classification, Parabolic SAR
//! - EMA stack, Bollinger, Donchian, RSI, MACD, stochastic, OBV/volume
//! - Indicator frame with a polars view
//! - Regime-gated tri-state signals and weighted tier classification
//! - Price source trait and polars bar schema for collaborators

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod frame;
pub mod indicators;
pub mod pipeline;
pub mod scoring;

pub use config::{ConfigError, EngineConfig, IndicatorParams};
pub use domain::{Bar, Instrument};
pub use engine::{Analysis, SignalEngine};
pub use frame::{BarSnapshot, FrameError, IndicatorFrame};
pub use pipeline::build_frame;
pub use scoring::{ScoreResult, ScoringConfig, Signal, SignalEvaluation, SignalTier, Strength, Verdict};
