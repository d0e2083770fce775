//! Relative Strength Index (RSI).
//!
//! Gains and losses come from consecutive close differences. Both are
//! averaged with an exponential average of `alpha = 1/period`, seeded with the
//! first difference and reported once `period` differences have been seen.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0; both → 50.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::labels::Zone;
use crate::indicators::smoothing::{scan, Ema};
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rsi {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RsiColumns {
    pub rsi: Vec<f64>,
    pub zone: Vec<Zone>,
    pub above_50: Vec<bool>,
}

impl Indicator for Rsi {
    type Output = RsiColumns;

    fn name(&self) -> String {
        format!("rsi_{}", self.period)
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> RsiColumns {
        let deltas: Vec<f64> = std::iter::once(f64::NAN)
            .chain(bars.windows(2).map(|w| w[1].close - w[0].close))
            .take(bars.len())
            .collect();
        // f64::max drops NaN, so bar 0 is kept explicitly.
        let gains: Vec<f64> = deltas
            .iter()
            .map(|&d| if d.is_nan() { d } else { d.max(0.0) })
            .collect();
        let losses: Vec<f64> = deltas
            .iter()
            .map(|&d| if d.is_nan() { d } else { (-d).max(0.0) })
            .collect();

        let avg_gain = scan(&gains, Ema::wilder(self.period));
        let avg_loss = scan(&losses, Ema::wilder(self.period));

        let rsi: Vec<f64> = avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    compute_rsi(g, l)
                }
            })
            .collect();

        RsiColumns {
            zone: rsi
                .iter()
                .map(|&v| Zone::classify(v, self.overbought, self.oversold))
                .collect(),
            above_50: rsi.iter().map(|&v| v > 50.0).collect(),
            rsi,
        }
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
