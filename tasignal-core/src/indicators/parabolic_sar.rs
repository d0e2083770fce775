//! Parabolic SAR: Wilder's stop-and-reverse system.
//!
//! Inherently sequential: the state `{trend, sar, ep, af}` is carried from
//! bar to bar by [`SarState::step`], and the series is a fold over it.
//!
//! Seed at bar 0: uptrend, SAR = low[0], EP = high[0], AF = af_start.
//!
//! Uptrend step:
//! - SAR moves toward EP by AF and is clamped to at most the prior two lows
//! - `low <= SAR` flips to downtrend: SAR becomes the old EP, EP = low, AF resets
//! - otherwise a new high raises EP and increments AF up to the cap
//!
//! Downtrend is the mirror image. Only High/Low are read.
//!
//! Parameters: af_start (default 0.02), af_step (default 0.02), af_max (default 0.20).
//! Lookback: 0.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParabolicSar {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.20,
        }
    }
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        assert!(af_start > 0.0, "AF start must be > 0");
        assert!(af_step > 0.0, "AF step must be > 0");
        assert!(af_max >= af_start, "AF max must be >= AF start");
        Self {
            af_start,
            af_step,
            af_max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SarTrend {
    Up,
    Down,
}

/// Carried SAR state after a bar has been processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState {
    pub trend: SarTrend,
    pub sar: f64,
    pub ep: f64,
    pub af: f64,
}

/// The high/low of the one or two bars preceding the current one.
#[derive(Debug, Clone, Copy)]
pub struct PriorRange {
    pub low1: f64,
    pub high1: f64,
    pub low2: Option<f64>,
    pub high2: Option<f64>,
}

impl SarState {
    pub fn seed(first: &Bar, params: &ParabolicSar) -> Self {
        Self {
            trend: SarTrend::Up,
            sar: first.low,
            ep: first.high,
            af: params.af_start,
        }
    }

    /// Advance by one bar.
    pub fn step(self, bar: &Bar, prior: PriorRange, params: &ParabolicSar) -> Self {
        let raw = self.sar + self.af * (self.ep - self.sar);
        match self.trend {
            SarTrend::Up => {
                let ceiling = prior.low2.map_or(prior.low1, |l2| prior.low1.min(l2));
                let sar = raw.min(ceiling);
                if bar.low <= sar {
                    Self {
                        trend: SarTrend::Down,
                        sar: self.ep,
                        ep: bar.low,
                        af: params.af_start,
                    }
                } else if bar.high > self.ep {
                    Self {
                        sar,
                        ep: bar.high,
                        af: (self.af + params.af_step).min(params.af_max),
                        ..self
                    }
                } else {
                    Self { sar, ..self }
                }
            }
            SarTrend::Down => {
                let floor = prior.high2.map_or(prior.high1, |h2| prior.high1.max(h2));
                let sar = raw.max(floor);
                if bar.high >= sar {
                    Self {
                        trend: SarTrend::Up,
                        sar: self.ep,
                        ep: bar.high,
                        af: params.af_start,
                    }
                } else if bar.low < self.ep {
                    Self {
                        sar,
                        ep: bar.low,
                        af: (self.af + params.af_step).min(params.af_max),
                        ..self
                    }
                } else {
                    Self { sar, ..self }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SarColumns {
    pub psar: Vec<f64>,
    /// True while the state after the bar is an uptrend.
    pub psar_bull: Vec<bool>,
}

impl Indicator for ParabolicSar {
    type Output = SarColumns;

    fn name(&self) -> String {
        format!("psar_{}_{}_{}", self.af_start, self.af_step, self.af_max)
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> SarColumns {
        let Some(first) = bars.first() else {
            return SarColumns::default();
        };

        let seed = SarState::seed(first, self);
        let states: Vec<SarState> = std::iter::once(seed)
            .chain((1..bars.len()).scan(seed, |state, i| {
                let prior = PriorRange {
                    low1: bars[i - 1].low,
                    high1: bars[i - 1].high,
                    low2: i.checked_sub(2).map(|j| bars[j].low),
                    high2: i.checked_sub(2).map(|j| bars[j].high),
                };
                *state = state.step(&bars[i], prior, self);
                Some(*state)
            }))
            .collect();

        SarColumns {
            psar: states.iter().map(|s| s.sar).collect(),
            psar_bull: states.iter().map(|s| s.trend == SarTrend::Up).collect(),
        }
    }
}
