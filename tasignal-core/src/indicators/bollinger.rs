//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper / Lower: middle +/- mult * stddev(close, period)
//! - Bandwidth: (upper - lower) / middle
//! - %B: (close - lower) / (upper - lower), NaN on zero width
//! - Squeeze: bandwidth <= its rolling minimum over `squeeze_lookback` bars
//!   (at least half the lookback observed); NaN compares false
//!
//! Widths are compared unrounded. A bar whose width differs from the floor
//! only past the fourth decimal is not a squeeze here, where a comparison
//! on widths rounded to 4 decimals would call it a tie.
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::smoothing::{rolling_min, rolling_std, sma};
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bollinger {
    pub period: usize,
    pub multiplier: f64,
    pub squeeze_lookback: usize,
}

impl Default for Bollinger {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
            squeeze_lookback: 126,
        }
    }
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, squeeze_lookback: usize) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        assert!(multiplier > 0.0, "Bollinger multiplier must be > 0");
        assert!(squeeze_lookback >= 1, "squeeze lookback must be >= 1");
        Self {
            period,
            multiplier,
            squeeze_lookback,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerColumns {
    pub mid: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub width: Vec<f64>,
    pub pct: Vec<f64>,
    pub squeeze: Vec<bool>,
}

impl Indicator for Bollinger {
    type Output = BollingerColumns;

    fn name(&self) -> String {
        format!("bollinger_{}_{}", self.period, self.multiplier)
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> BollingerColumns {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mid = sma(&closes, self.period);
        let std = rolling_std(&closes, self.period);

        let upper: Vec<f64> = mid
            .iter()
            .zip(&std)
            .map(|(m, s)| m + self.multiplier * s)
            .collect();
        let lower: Vec<f64> = mid
            .iter()
            .zip(&std)
            .map(|(m, s)| m - self.multiplier * s)
            .collect();

        let width: Vec<f64> = (0..closes.len())
            .map(|i| (upper[i] - lower[i]) / mid[i])
            .collect();
        let pct: Vec<f64> = (0..closes.len())
            .map(|i| {
                let range = upper[i] - lower[i];
                if range == 0.0 {
                    f64::NAN
                } else {
                    (closes[i] - lower[i]) / range
                }
            })
            .collect();

        let squeeze = squeeze_flags(&width, self.squeeze_lookback);

        BollingerColumns {
            mid,
            upper,
            lower,
            width,
            pct,
            squeeze,
        }
    }
}

/// Bandwidth at or below its rolling floor, compared unrounded.
pub fn squeeze_flags(width: &[f64], lookback: usize) -> Vec<bool> {
    let floor = rolling_min(width, lookback, lookback / 2);
    width.iter().zip(&floor).map(|(w, f)| w <= f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bands_use_sample_std() {
        let closes = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let cols = Bollinger::new(8, 2.0, 126).compute(&make_bars(&closes));
        let std = (32.0_f64 / 7.0).sqrt();
        assert_approx(cols.mid[7], 5.0, DEFAULT_EPSILON);
        assert_approx(cols.upper[7], 5.0 + 2.0 * std, 1e-12);
        assert_approx(cols.lower[7], 5.0 - 2.0 * std, 1e-12);
        assert_approx(cols.width[7], 4.0 * std / 5.0, 1e-12);
        // close 9 -> (9 - lower) / (upper - lower)
        assert_approx(cols.pct[7], (9.0 - (5.0 - 2.0 * std)) / (4.0 * std), 1e-12);
        assert!(cols.mid[6].is_nan());
    }

    #[test]
    fn flat_series_squeezes_once_window_fills() {
        let cols = Bollinger::default().compute(&make_bars(&[100.0; 250]));
        // Width is first computable at 19; the squeeze floor needs 63 of them.
        assert_eq!(cols.width[19], 0.0);
        assert!(!cols.squeeze[80]);
        assert!(cols.squeeze[81]);
        assert!(cols.squeeze[249]);
        assert!(cols.pct[249].is_nan());
    }

    #[test]
    fn flat_series_has_no_percent_b_at_any_level() {
        for level in [3.3, 0.1, 42.0, 987.65] {
            let cols = Bollinger::default().compute(&make_bars(&[level; 250]));
            assert!(cols.width[19..].iter().all(|&w| w == 0.0), "width at {level}");
            assert!(cols.pct.iter().all(|p| p.is_nan()), "pct at {level}");
            assert!(cols.squeeze[249], "squeeze at {level}");
        }
    }

    #[test]
    fn squeeze_compares_unrounded_widths() {
        // Equal to 4 decimals, but the last width sits above the floor.
        let width = [0.0512, 0.0501, 0.05012, 0.05013];
        assert_eq!(squeeze_flags(&width, 4), vec![false, true, false, false]);
        let tied = [0.0512, 0.0501, 0.0501, 0.0501];
        assert_eq!(squeeze_flags(&tied, 4), vec![false, true, true, true]);
    }

    #[test]
    fn widening_band_is_not_a_squeeze() {
        let closes: Vec<f64> = (0..150)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * (1.0 + i as f64 * 0.1))
            .collect();
        let cols = Bollinger::default().compute(&make_bars(&closes));
        assert!(!cols.squeeze[149]);
    }

    #[test]
    fn short_series_never_squeezes() {
        let cols = Bollinger::default().compute(&make_bars(&[100.0; 50]));
        assert!(cols.squeeze.iter().all(|s| !s));
        assert_eq!(Bollinger::default().lookback(), 19);
    }
}
