//! Signal engine: frame construction plus scoring in one call.
//!
//! The engine holds only configuration. Every call builds a fresh frame from
//! the bars it is given and keeps nothing afterwards, so one engine can be
//! shared across threads.

use tracing::debug;

use crate::config::{ConfigError, EngineConfig};
use crate::domain::{Bar, Instrument};
use crate::frame::{FrameError, IndicatorFrame};
use crate::pipeline::build_frame;
use crate::scoring::{score_snapshot, ScoreResult};

/// Decision plus the frame it was derived from.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: ScoreResult,
    pub frame: IndicatorFrame,
}

#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    config: EngineConfig,
}

impl SignalEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the frame and score its last bar.
    pub fn analyze(&self, instrument: Instrument, bars: Vec<Bar>) -> Result<Analysis, FrameError> {
        let frame = build_frame(bars, &self.config.indicators)?;
        let row = frame.decision_row().ok_or(FrameError::EmptySeries)?;
        let result = score_snapshot(instrument, &row, &self.config.scoring);
        debug!(
            instrument = %result.instrument,
            regime = %result.regime,
            score = result.score,
            ceiling = result.ceiling,
            signal = %result.signal,
            "scored"
        );
        Ok(Analysis { result, frame })
    }

    /// Like [`SignalEngine::analyze`] but drops the frame.
    pub fn score(&self, instrument: Instrument, bars: Vec<Bar>) -> Result<ScoreResult, FrameError> {
        self.analyze(instrument, bars).map(|a| a.result)
    }
}
