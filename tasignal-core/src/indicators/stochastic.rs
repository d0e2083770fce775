//! Slow stochastic oscillator.
//!
//! fast %K = 100 * (close - lowest low) / (highest high - lowest low) over `k_period`
//! slow %K = SMA(fast %K, smooth)
//! slow %D = SMA(slow %K, d_period)
//! Zone is taken from %D. A zero high-low range leaves %K NaN.
//!
//! Lookback: k_period + smooth + d_period - 3.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::labels::Zone;
use crate::indicators::smoothing::{rolling_max, rolling_min, sma};
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stochastic {
    pub k_period: usize,
    pub smooth: usize,
    pub d_period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            smooth: 3,
            d_period: 3,
            overbought: 80.0,
            oversold: 20.0,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, smooth: usize, d_period: usize) -> Self {
        assert!(
            k_period >= 1 && smooth >= 1 && d_period >= 1,
            "stochastic periods must be >= 1"
        );
        Self {
            k_period,
            smooth,
            d_period,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticColumns {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub zone: Vec<Zone>,
}

impl Indicator for Stochastic {
    type Output = StochasticColumns;

    fn name(&self) -> String {
        format!("stoch_{}_{}_{}", self.k_period, self.smooth, self.d_period)
    }

    fn lookback(&self) -> usize {
        self.k_period + self.smooth + self.d_period - 3
    }

    fn compute(&self, bars: &[Bar]) -> StochasticColumns {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let highest = rolling_max(&highs, self.k_period, self.k_period);
        let lowest = rolling_min(&lows, self.k_period, self.k_period);

        let fast_k: Vec<f64> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let range = highest[i] - lowest[i];
                if range == 0.0 {
                    f64::NAN
                } else {
                    100.0 * (bar.close - lowest[i]) / range
                }
            })
            .collect();

        let k = sma(&fast_k, self.smooth);
        let d = sma(&k, self.d_period);
        let zone = d
            .iter()
            .map(|&v| Zone::classify(v, self.overbought, self.oversold))
            .collect();

        StochasticColumns { k, d, zone }
    }
}
