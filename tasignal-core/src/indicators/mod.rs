//! Indicator recurrences.
//!
//! Every indicator is a small serde-configurable parameter struct that
//! implements [`Indicator`]: full bar history in, a group of same-length
//! columns out. Bars without enough history carry `f64::NAN`.
//!
//! Multi-column indicators (DMI, Bollinger, MACD, ...) return one struct of
//! named columns instead of several single-series instances.

pub mod adx;
pub mod bollinger;
pub mod donchian;
pub mod labels;
pub mod macd;
pub mod moving_average;
pub mod parabolic_sar;
pub mod regime;
pub mod rsi;
pub mod smoothing;
pub mod stochastic;
pub mod volume;

pub use adx::{Dmi, DmiColumns};
pub use bollinger::{Bollinger, BollingerColumns};
pub use donchian::{Breakout, Donchian, DonchianColumns};
pub use labels::{Direction, Zone};
pub use macd::{Macd, MacdColumns};
pub use moving_average::{MaAlignment, MaColumns, MovingAverages, PriceLevel};
pub use parabolic_sar::{ParabolicSar, SarColumns, SarState, SarTrend};
pub use regime::{Regime, RegimeThresholds};
pub use rsi::{Rsi, RsiColumns};
pub use stochastic::{Stochastic, StochasticColumns};
pub use volume::{VolumeColumns, VolumeContext, VolumePriceSignal};

use crate::domain::Bar;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No output at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Column group produced by [`Indicator::compute`]; every column has one
    /// entry per input bar.
    type Output;

    /// Human-readable name (e.g., "adx_14", "rsi_14").
    fn name(&self) -> String;

    /// Index of the first bar with a computable primary value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Self::Output;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples, volume = 1000.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
