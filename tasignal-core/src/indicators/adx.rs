//! ADX / DMI: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. True Range and +DM / -DM from consecutive bars (bar 0 has neither)
//! 2. Cumulative Wilder smoothing of TR, +DM, -DM over the series from bar 1
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), NaN when smoothed(TR) <= 0
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI), NaN when the sum is <= 0
//! 6. ADX = averaging Wilder smoothing of DX
//!
//! Lookback: 2 * period - 1 (DI is first computable at bar `period`).

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::smoothing::{wilder_mean, wilder_sum};
use crate::indicators::Indicator;

/// Directional movement system parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dmi {
    pub period: usize,
}

impl Default for Dmi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Dmi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self { period }
    }
}

/// Columns produced by the directional movement system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmiColumns {
    pub true_range: Vec<f64>,
    pub di_plus: Vec<f64>,
    pub di_minus: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

/// True Range per bar. TR[0] is NaN (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
///
/// A NaN in any of the three inputs gives NaN. `f64::max` would drop it
/// and fall back to another term.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = vec![f64::NAN; bars.len()];
    for (i, pair) in bars.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let pc = prev.close;
        if cur.high.is_nan() || cur.low.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i + 1] = (cur.high - cur.low)
            .max((cur.high - pc).abs())
            .max((cur.low - pc).abs());
    }
    tr
}

/// +DM and -DM per bar. Bar 0 carries 0 for both.
pub fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus = vec![0.0; n];
    let mut minus = vec![0.0; n];
    for (i, pair) in bars.windows(2).enumerate() {
        let up = pair[1].high - pair[0].high;
        let down = pair[0].low - pair[1].low;
        if up > down && up > 0.0 {
            plus[i + 1] = up;
        }
        if down > up && down > 0.0 {
            minus[i + 1] = down;
        }
    }
    (plus, minus)
}

impl Indicator for Dmi {
    type Output = DmiColumns;

    fn name(&self) -> String {
        format!("adx_{}", self.period)
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> DmiColumns {
        let n = bars.len();
        let tr = true_range(bars);
        if n < 2 {
            return DmiColumns {
                true_range: tr,
                di_plus: vec![f64::NAN; n],
                di_minus: vec![f64::NAN; n],
                dx: vec![f64::NAN; n],
                adx: vec![f64::NAN; n],
            };
        }

        let (plus_dm, minus_dm) = directional_movement(bars);

        // Smoothing starts at bar 1; index j below is bar j + 1.
        let smooth_tr = wilder_sum(&tr[1..], self.period);
        let smooth_plus = wilder_sum(&plus_dm[1..], self.period);
        let smooth_minus = wilder_sum(&minus_dm[1..], self.period);

        let ratio = |dm: f64, tr: f64| {
            if tr > 0.0 {
                100.0 * dm / tr
            } else {
                f64::NAN
            }
        };
        let di_plus: Vec<f64> = smooth_plus
            .iter()
            .zip(&smooth_tr)
            .map(|(&dm, &tr)| ratio(dm, tr))
            .collect();
        let di_minus: Vec<f64> = smooth_minus
            .iter()
            .zip(&smooth_tr)
            .map(|(&dm, &tr)| ratio(dm, tr))
            .collect();

        let dx: Vec<f64> = di_plus
            .iter()
            .zip(&di_minus)
            .map(|(&p, &m)| {
                let sum = p + m;
                if sum > 0.0 {
                    // Ratio first: a one-sided move gives exactly 100.
                    100.0 * ((p - m).abs() / sum)
                } else {
                    f64::NAN
                }
            })
            .collect();
        let adx = wilder_mean(&dx, self.period);

        let pad = |v: Vec<f64>| -> Vec<f64> { std::iter::once(f64::NAN).chain(v).collect() };
        let columns = DmiColumns {
            true_range: tr,
            di_plus: pad(di_plus),
            di_minus: pad(di_minus),
            dx: pad(dx),
            adx: pad(adx),
        };
        debug_assert_eq!(columns.adx.len(), n);
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn true_range_formula() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 101.0, 106.0), // h-l = 7, |h-pc| = 6, |l-pc| = 1
            (106.0, 107.0, 98.0, 99.0),   // h-l = 9
            (99.0, 100.0, 99.5, 99.8),    // h-l = 0.5, |h-pc| = 1, |l-pc| = 0.5
            (99.8, 112.0, 110.0, 111.0),  // gap up: |h-pc| = 12.2
        ]);
        let tr = true_range(&bars);
        assert!(tr[0].is_nan());
        assert_approx(tr[1], 7.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 9.0, DEFAULT_EPSILON);
        assert_approx(tr[3], 1.0, DEFAULT_EPSILON);
        assert_approx(tr[4], 12.2, 1e-9);
    }

    #[test]
    fn true_range_propagates_missing_values() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 101.0, f64::NAN),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, f64::NAN, 99.5, 99.8),
            (99.8, 112.0, 110.0, 111.0),
        ]);
        let tr = true_range(&bars);
        assert_approx(tr[1], 7.0, DEFAULT_EPSILON);
        // Previous close missing.
        assert!(tr[2].is_nan());
        // High missing.
        assert!(tr[3].is_nan());
        assert_approx(tr[4], 12.2, 1e-9);
    }

    #[test]
    fn directional_movement_rules() {
        let bars = make_ohlc_bars(&[
            (10.0, 11.0, 9.0, 10.0),
            (10.0, 12.0, 9.5, 11.0), // up 1, down -0.5 -> +DM 1
            (11.0, 12.5, 8.0, 9.0),  // up 0.5, down 1.5 -> -DM 1.5
            (9.0, 12.5, 8.0, 9.0),   // up 0, down 0 -> neither
            (9.0, 13.5, 7.0, 9.0),   // up 1, down 1 -> tie, neither
        ]);
        let (plus, minus) = directional_movement(&bars);
        assert_eq!(plus, vec![0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(minus, vec![0.0, 0.0, 1.5, 0.0, 0.0]);
    }

    #[test]
    fn di_first_computable_at_period() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
        ]);
        let cols = Dmi::new(3).compute(&bars);
        assert!(cols.di_plus[2].is_nan());
        assert!(!cols.di_plus[3].is_nan());

        // Sums over bars 1..=3: TR = 8 + 9 + 6, +DM = 3 + 0 + 0, -DM = 0 + 2 + 1
        let str3 = 8.0 + 9.0 + 6.0;
        assert_approx(cols.di_plus[3], 100.0 * 3.0 / str3, 1e-9);
        assert_approx(cols.di_minus[3], 100.0 * 3.0 / str3, 1e-9);
        assert_approx(cols.dx[3], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn adx_bounds() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let cols = Dmi::new(3).compute(&bars);
        for (i, &v) in cols.adx.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "ADX out of bounds at bar {i}: {v}");
            }
        }
        assert!(cols.adx[..5].iter().all(|v| v.is_nan()));
        assert!(!cols.adx[5].is_nan());
    }

    #[test]
    fn adx_strong_trend_elevated() {
        let data: Vec<_> = (0..40)
            .map(|i| {
                let base = 100.0 + i as f64 * 5.0;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        let cols = Dmi::new(5).compute(&make_ohlc_bars(&data));
        let last = *cols.adx.last().unwrap();
        assert!(last > 40.0, "ADX should be elevated in strong trend, got {last}");
        assert!(cols.di_plus.last().unwrap() > cols.di_minus.last().unwrap());
    }

    #[test]
    fn flat_series_has_no_directional_values() {
        let bars = make_ohlc_bars(&[(50.0, 50.0, 50.0, 50.0); 40]);
        let cols = Dmi::default().compute(&bars);
        assert!(cols.di_plus.iter().all(|v| v.is_nan()));
        assert!(cols.adx.iter().all(|v| v.is_nan()));
        assert!(cols.true_range[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn adx_lookback() {
        assert_eq!(Dmi::new(14).lookback(), 27);
        assert_eq!(Dmi::new(7).lookback(), 13);
        assert_eq!(Dmi::default().name(), "adx_14");
    }

    #[test]
    fn adx_too_few_bars() {
        let cols = Dmi::new(3).compute(&make_ohlc_bars(&[(100.0, 105.0, 95.0, 102.0)]));
        assert_eq!(cols.adx.len(), 1);
        assert!(cols.adx[0].is_nan());
        assert!(cols.true_range[0].is_nan());
        assert!(Dmi::new(3).compute(&[]).adx.is_empty());
    }
}
