//! Market regime classification from ADX level and slope.
//!
//! First match wins:
//! 1. `exhaustion`: ADX above the exhaustion level and not rising
//! 2. `trending`: ADX at or above the trending level
//! 3. `weak_trend`: ADX at or above the weak-trend level
//! 4. `ranging`: everything else, including a NaN ADX
//!
//! "Rising" means strictly greater than the previous bar's ADX; a NaN on
//! either side counts as not rising.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Market regime for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    #[default]
    Ranging,
    WeakTrend,
    Trending,
    Exhaustion,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Ranging => "ranging",
            Regime::WeakTrend => "weak_trend",
            Regime::Trending => "trending",
            Regime::Exhaustion => "exhaustion",
        }
    }

    /// Trend-following signals are meaningful in this regime.
    pub fn is_trend(&self) -> bool {
        matches!(self, Regime::Trending | Regime::WeakTrend)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ADX levels separating the regimes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeThresholds {
    pub weak_trend: f64,
    pub trending: f64,
    pub exhaustion: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            weak_trend: 20.0,
            trending: 25.0,
            exhaustion: 40.0,
        }
    }
}

impl RegimeThresholds {
    /// Classify a single bar from its ADX and the previous bar's ADX.
    pub fn classify(&self, adx: f64, prev_adx: f64) -> Regime {
        let rising = adx > prev_adx;
        if adx > self.exhaustion && !rising {
            Regime::Exhaustion
        } else if adx >= self.trending {
            Regime::Trending
        } else if adx >= self.weak_trend {
            Regime::WeakTrend
        } else {
            Regime::Ranging
        }
    }

    /// Classify every bar of an ADX series.
    pub fn classify_series(&self, adx: &[f64]) -> Vec<Regime> {
        adx.iter()
            .enumerate()
            .map(|(i, &value)| {
                let prev = if i == 0 { f64::NAN } else { adx[i - 1] };
                self.classify(value, prev)
            })
            .collect()
    }

    pub fn is_ordered(&self) -> bool {
        self.weak_trend <= self.trending && self.trending <= self.exhaustion
    }
}
