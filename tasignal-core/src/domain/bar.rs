//! Bar: one trading day of OHLCV data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar.
///
/// Volume is carried as `f64` so that vendor data with fractional share
/// counts and the OBV accumulator share one numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A vendor gap: at least one field is missing (NaN).
    pub fn has_gap(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .any(|v| v.is_nan())
    }

    /// Open and close inside [low, high], prices positive, volume
    /// non-negative. Gapped bars are never consistent.
    pub fn is_consistent(&self) -> bool {
        !self.has_gap()
            && self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
            && self.low > 0.0
            && self.volume >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        Bar::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), open, high, low, close, volume)
    }

    #[test]
    fn consistent_bar() {
        let b = bar(100.0, 105.0, 98.0, 103.0, 50_000.0);
        assert!(!b.has_gap());
        assert!(b.is_consistent());
    }

    #[test]
    fn missing_volume_is_a_gap() {
        let b = bar(100.0, 105.0, 98.0, 103.0, f64::NAN);
        assert!(b.has_gap());
        assert!(!b.is_consistent());
    }

    #[test]
    fn close_outside_range_is_inconsistent() {
        assert!(!bar(100.0, 102.0, 98.0, 103.0, 1.0).is_consistent());
        assert!(!bar(0.0, 0.0, 0.0, 0.0, 1.0).is_consistent());
    }

    #[test]
    fn flat_bar_is_consistent() {
        assert!(bar(42.0, 42.0, 42.0, 42.0, 0.0).is_consistent());
    }

    #[test]
    fn serde_roundtrip() {
        let b = bar(100.0, 105.0, 98.0, 103.0, 50_000.0);
        let json = serde_json::to_string(&b).unwrap();
        assert!(json.contains("\"date\":\"2024-01-02\""));
        assert_eq!(serde_json::from_str::<Bar>(&json).unwrap(), b);
    }
}
