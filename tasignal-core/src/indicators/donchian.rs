//! Donchian Channel: highest high / lowest low of the prior `period` bars.
//!
//! The channel excludes the current bar (shift by one), so today's close can
//! break out of it:
//! - High: max(high[t-period..t])
//! - Low:  min(low[t-period..t])
//! - Breakout: `up` if close > high, `down` if close < low
//!
//! Lookback: period.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Bar;
use crate::indicators::smoothing::{lag, rolling_max, rolling_min};
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Donchian {
    pub period: usize,
}

impl Default for Donchian {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Donchian {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Donchian period must be >= 1");
        Self { period }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakout {
    Up,
    Down,
}

impl Breakout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Breakout::Up => "up",
            Breakout::Down => "down",
        }
    }
}

impl fmt::Display for Breakout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonchianColumns {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub breakout: Vec<Option<Breakout>>,
}

impl Indicator for Donchian {
    type Output = DonchianColumns;

    fn name(&self) -> String {
        format!("donchian_{}", self.period)
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> DonchianColumns {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let high = rolling_max(&lag(&highs), self.period, self.period);
        let low = rolling_min(&lag(&lows), self.period, self.period);

        let breakout = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                if bar.close > high[i] {
                    Some(Breakout::Up)
                } else if bar.close < low[i] {
                    Some(Breakout::Down)
                } else {
                    None
                }
            })
            .collect();

        DonchianColumns {
            high,
            low,
            breakout,
        }
    }
}
