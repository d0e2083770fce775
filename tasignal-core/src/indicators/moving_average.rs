//! EMA stack and moving-average context.
//!
//! Four span EMAs (default 9 / 21 / 50 / 200), each seeded with the first
//! close. Context columns:
//! - price vs. the medium and long EMA: `above` iff close > EMA
//! - alignment: `bullish` iff fast > short > medium > long, `bearish` iff the
//!   chain is fully reversed, `mixed` otherwise
//!
//! Lookback: 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Bar;
use crate::indicators::smoothing::ema;
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverages {
    pub fast: usize,
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

impl Default for MovingAverages {
    fn default() -> Self {
        Self {
            fast: 9,
            short: 21,
            medium: 50,
            long: 200,
        }
    }
}

impl MovingAverages {
    pub fn new(fast: usize, short: usize, medium: usize, long: usize) -> Self {
        assert!(fast >= 1, "EMA period must be >= 1");
        assert!(
            fast < short && short < medium && medium < long,
            "EMA periods must be strictly increasing"
        );
        Self {
            fast,
            short,
            medium,
            long,
        }
    }

    pub fn periods(&self) -> [usize; 4] {
        [self.fast, self.short, self.medium, self.long]
    }
}

/// Position of the close relative to a moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceLevel {
    Above,
    #[default]
    Below,
}

impl PriceLevel {
    /// NaN on either side is `Below`.
    pub fn of(close: f64, average: f64) -> Self {
        if close > average {
            PriceLevel::Above
        } else {
            PriceLevel::Below
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Above => "above",
            PriceLevel::Below => "below",
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaAlignment {
    Bullish,
    Bearish,
    #[default]
    Mixed,
}

impl MaAlignment {
    /// Alignment of an EMA stack ordered fastest first.
    pub fn of(stack: [f64; 4]) -> Self {
        if stack.windows(2).all(|w| w[0] > w[1]) {
            MaAlignment::Bullish
        } else if stack.windows(2).all(|w| w[0] < w[1]) {
            MaAlignment::Bearish
        } else {
            MaAlignment::Mixed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaAlignment::Bullish => "bullish",
            MaAlignment::Bearish => "bearish",
            MaAlignment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for MaAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaColumns {
    /// Periods of `ema`, fastest first.
    pub periods: [usize; 4],
    pub ema: [Vec<f64>; 4],
    pub price_vs_medium: Vec<PriceLevel>,
    pub price_vs_long: Vec<PriceLevel>,
    pub alignment: Vec<MaAlignment>,
}

impl MaColumns {
    pub fn medium(&self) -> &[f64] {
        &self.ema[2]
    }

    pub fn long(&self) -> &[f64] {
        &self.ema[3]
    }
}

impl Indicator for MovingAverages {
    type Output = MaColumns;

    fn name(&self) -> String {
        format!(
            "ema_stack_{}_{}_{}_{}",
            self.fast, self.short, self.medium, self.long
        )
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> MaColumns {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let periods = self.periods();
        let ema = periods.map(|p| ema(&closes, p));

        let price_vs = |series: &[f64]| -> Vec<PriceLevel> {
            closes
                .iter()
                .zip(series)
                .map(|(&c, &m)| PriceLevel::of(c, m))
                .collect()
        };
        let price_vs_medium = price_vs(&ema[2]);
        let price_vs_long = price_vs(&ema[3]);

        let alignment = (0..closes.len())
            .map(|i| MaAlignment::of([ema[0][i], ema[1][i], ema[2][i], ema[3][i]]))
            .collect();

        MaColumns {
            periods,
            ema,
            price_vs_medium,
            price_vs_long,
            alignment,
        }
    }
}
