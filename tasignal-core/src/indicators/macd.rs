//! MACD: Moving Average Convergence / Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal)
//! histogram = line - signal; direction `rising` when above the previous bar
//!
//! All EMAs are seeded with the first value. Lookback: 0.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::labels::Direction;
use crate::indicators::smoothing::ema;
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be below the slow period");
        Self { fast, slow, signal }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdColumns {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    pub hist_direction: Vec<Direction>,
}

impl Indicator for Macd {
    type Output = MacdColumns;

    fn name(&self) -> String {
        format!("macd_{}_{}_{}", self.fast, self.slow, self.signal)
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> MacdColumns {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema(&closes, self.fast);
        let slow = ema(&closes, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema(&line, self.signal);
        let histogram: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

        let hist_direction = histogram
            .iter()
            .enumerate()
            .map(|(i, &h)| match i.checked_sub(1).map(|j| histogram[j]) {
                Some(prev) if h > prev => Direction::Rising,
                _ => Direction::Falling,
            })
            .collect();

        MacdColumns {
            line,
            signal,
            histogram,
            hist_direction,
        }
    }
}
