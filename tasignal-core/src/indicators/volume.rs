//! Volume indicators: On-Balance Volume and volume context.
//!
//! OBV accumulates `sign(close - prev_close) * volume` (0 on the first bar and
//! on unchanged closes). Its trend is `rising` when OBV >= EMA(OBV).
//!
//! Volume context compares each bar's volume against its SMA:
//! - ratio = volume / SMA, `above average` when ratio >= 1
//! - price/volume signal: price up or down against the previous close,
//!   crossed with volume above the SMA or not
//!
//! Lookback: sma_period - 1.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Bar;
use crate::indicators::labels::Direction;
use crate::indicators::smoothing::{ema, sma};
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeContext {
    pub obv_ema_period: usize,
    pub sma_period: usize,
}

impl Default for VolumeContext {
    fn default() -> Self {
        Self {
            obv_ema_period: 20,
            sma_period: 20,
        }
    }
}

impl VolumeContext {
    pub fn new(obv_ema_period: usize, sma_period: usize) -> Self {
        assert!(obv_ema_period >= 1, "OBV EMA period must be >= 1");
        assert!(sma_period >= 1, "volume SMA period must be >= 1");
        Self {
            obv_ema_period,
            sma_period,
        }
    }
}

/// Price direction crossed with volume strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumePriceSignal {
    BullishStrong,
    BullishWeak,
    BearishStrong,
    BearishWeak,
}

impl VolumePriceSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumePriceSignal::BullishStrong => "bullish_strong",
            VolumePriceSignal::BullishWeak => "bullish_weak",
            VolumePriceSignal::BearishStrong => "bearish_strong",
            VolumePriceSignal::BearishWeak => "bearish_weak",
        }
    }

    /// `None` for unchanged prices or a NaN volume average.
    pub fn classify(close: f64, prev_close: f64, volume: f64, volume_sma: f64) -> Option<Self> {
        let strong = volume > volume_sma;
        let weak = volume <= volume_sma;
        if close > prev_close {
            if strong {
                return Some(VolumePriceSignal::BullishStrong);
            }
            if weak {
                return Some(VolumePriceSignal::BullishWeak);
            }
        } else if close < prev_close {
            if strong {
                return Some(VolumePriceSignal::BearishStrong);
            }
            if weak {
                return Some(VolumePriceSignal::BearishWeak);
            }
        }
        None
    }
}

impl fmt::Display for VolumePriceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeColumns {
    pub obv: Vec<f64>,
    pub obv_ema: Vec<f64>,
    pub obv_trend: Vec<Direction>,
    pub volume_sma: Vec<f64>,
    pub volume_ratio: Vec<f64>,
    pub above_average: Vec<bool>,
    pub price_signal: Vec<Option<VolumePriceSignal>>,
}

/// On-Balance Volume.
pub fn on_balance_volume(bars: &[Bar]) -> Vec<f64> {
    let mut total = 0.0;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i > 0 {
                let change = bar.close - bars[i - 1].close;
                if change > 0.0 {
                    total += bar.volume;
                } else if change < 0.0 {
                    total -= bar.volume;
                }
            }
            total
        })
        .collect()
}

impl Indicator for VolumeContext {
    type Output = VolumeColumns;

    fn name(&self) -> String {
        format!("volume_{}_{}", self.obv_ema_period, self.sma_period)
    }

    fn lookback(&self) -> usize {
        self.sma_period - 1
    }

    fn compute(&self, bars: &[Bar]) -> VolumeColumns {
        let obv = on_balance_volume(bars);
        let obv_ema = ema(&obv, self.obv_ema_period);
        let obv_trend = obv
            .iter()
            .zip(&obv_ema)
            .map(|(o, e)| {
                if o >= e {
                    Direction::Rising
                } else {
                    Direction::Falling
                }
            })
            .collect();

        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let volume_sma = sma(&volumes, self.sma_period);
        let volume_ratio: Vec<f64> = volumes
            .iter()
            .zip(&volume_sma)
            .map(|(v, s)| v / s)
            .collect();
        let above_average = volume_ratio.iter().map(|&r| r >= 1.0).collect();

        let price_signal = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let prev_close = i.checked_sub(1).map_or(f64::NAN, |j| bars[j].close);
                VolumePriceSignal::classify(bar.close, prev_close, bar.volume, volume_sma[i])
            })
            .collect();

        VolumeColumns {
            obv,
            obv_ema,
            obv_trend,
            volume_sma,
            volume_ratio,
            above_average,
            price_signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn with_volumes(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
        let mut bars = make_bars(closes);
        for (bar, &v) in bars.iter_mut().zip(volumes) {
            bar.volume = v;
        }
        bars
    }

    #[test]
    fn obv_accumulates_signed_volume() {
        let bars = with_volumes(&[10.0, 11.0, 11.0, 10.5, 12.0], &[100.0, 200.0, 300.0, 400.0, 500.0]);
        assert_eq!(on_balance_volume(&bars), vec![0.0, 200.0, 200.0, -200.0, 300.0]);
    }

    #[test]
    fn constant_volume_is_exactly_average() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let bars = with_volumes(&closes, &[1_000_000.0; 30]);
        let cols = VolumeContext::default().compute(&bars);
        assert!(cols.volume_ratio[18].is_nan());
        assert_eq!(cols.volume_ratio[29], 1.0);
        assert!(cols.above_average[29]);
        // Volume equal to its average is the weak case.
        assert_eq!(cols.price_signal[29], Some(VolumePriceSignal::BullishWeak));
        assert_eq!(cols.obv_trend[29], Direction::Rising);
    }

    #[test]
    fn price_signal_quadrants() {
        use VolumePriceSignal::*;
        assert_eq!(VolumePriceSignal::classify(11.0, 10.0, 150.0, 100.0), Some(BullishStrong));
        assert_eq!(VolumePriceSignal::classify(11.0, 10.0, 100.0, 100.0), Some(BullishWeak));
        assert_eq!(VolumePriceSignal::classify(9.0, 10.0, 150.0, 100.0), Some(BearishStrong));
        assert_eq!(VolumePriceSignal::classify(9.0, 10.0, 50.0, 100.0), Some(BearishWeak));
        assert_eq!(VolumePriceSignal::classify(10.0, 10.0, 150.0, 100.0), None);
        assert_eq!(VolumePriceSignal::classify(11.0, 10.0, 150.0, f64::NAN), None);
    }

    #[test]
    fn falling_obv_trend() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let cols = VolumeContext::default().compute(&make_bars(&closes));
        assert_eq!(cols.obv_trend[29], Direction::Falling);
        assert!(cols.price_signal[0].is_none());
    }
}
