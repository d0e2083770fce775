//! Tri-state signal evaluation on the decision bar.
//!
//! Each signal either fires, does not fire, or is not applicable in the
//! current regime. Not-applicable signals add nothing to the score but their
//! weights still count towards the ceiling.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::frame::BarSnapshot;
use crate::indicators::{Breakout, Direction, MaAlignment, PriceLevel, Regime, VolumePriceSignal, Zone};

/// Every signal the scorer knows, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    // Trend context
    MaAlignment,
    PriceVsEma200,
    PriceVsEma50,
    // Regime and trend strength
    RegimeTrending,
    DmiBullish,
    PsarBullish,
    DonchianBreakout,
    // Momentum
    RsiAbove50,
    RsiOversold,
    StochOversold,
    MacdCross,
    MacdHistRising,
    MacdAboveZero,
    // Volume
    ObvRising,
    VolStrongBull,
    VolAboveAvg,
    // Bollinger
    BbSqueeze,
    BbPctLow,
}

impl Signal {
    pub const ALL: [Signal; 18] = [
        Signal::MaAlignment,
        Signal::PriceVsEma200,
        Signal::PriceVsEma50,
        Signal::RegimeTrending,
        Signal::DmiBullish,
        Signal::PsarBullish,
        Signal::DonchianBreakout,
        Signal::RsiAbove50,
        Signal::RsiOversold,
        Signal::StochOversold,
        Signal::MacdCross,
        Signal::MacdHistRising,
        Signal::MacdAboveZero,
        Signal::ObvRising,
        Signal::VolStrongBull,
        Signal::VolAboveAvg,
        Signal::BbSqueeze,
        Signal::BbPctLow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::MaAlignment => "ma_alignment",
            Signal::PriceVsEma200 => "price_vs_ema200",
            Signal::PriceVsEma50 => "price_vs_ema50",
            Signal::RegimeTrending => "regime_trending",
            Signal::DmiBullish => "dmi_bullish",
            Signal::PsarBullish => "psar_bullish",
            Signal::DonchianBreakout => "donchian_breakout",
            Signal::RsiAbove50 => "rsi_above50",
            Signal::RsiOversold => "rsi_oversold",
            Signal::StochOversold => "stoch_oversold",
            Signal::MacdCross => "macd_cross",
            Signal::MacdHistRising => "macd_hist_rising",
            Signal::MacdAboveZero => "macd_above_zero",
            Signal::ObvRising => "obv_rising",
            Signal::VolStrongBull => "vol_strong_bull",
            Signal::VolAboveAvg => "vol_above_avg",
            Signal::BbSqueeze => "bb_squeeze",
            Signal::BbPctLow => "bb_pct_low",
        }
    }

    /// Readable description for console reports.
    pub fn label(&self) -> &'static str {
        match self {
            Signal::MaAlignment => "MA alignment bullish (ema9 > 21 > 50 > 200)",
            Signal::PriceVsEma200 => "Close above EMA200",
            Signal::PriceVsEma50 => "Close above EMA50",
            Signal::RegimeTrending => "Regime: trending (ADX >= 25)",
            Signal::DmiBullish => "DMI: DI+ > DI-",
            Signal::PsarBullish => "Parabolic SAR bullish",
            Signal::DonchianBreakout => "Donchian breakout above 20-day high",
            Signal::RsiAbove50 => "RSI > 50 (upward momentum)",
            Signal::RsiOversold => "RSI oversold (ranging signal)",
            Signal::StochOversold => "Stochastic oversold",
            Signal::MacdCross => "MACD above signal line",
            Signal::MacdHistRising => "MACD histogram rising",
            Signal::MacdAboveZero => "MACD above zero",
            Signal::ObvRising => "OBV rising (buying volume)",
            Signal::VolStrongBull => "Volume confirms price rise",
            Signal::VolAboveAvg => "Volume above average",
            Signal::BbSqueeze => "Bollinger squeeze active",
            Signal::BbPctLow => "Close near lower Bollinger band (%B < 0.2)",
        }
    }

    /// Whether the signal can be evaluated in `regime`. Exhaustion is
    /// handled separately by the scorer.
    pub fn applies_in(&self, regime: Regime) -> bool {
        match self {
            Signal::PsarBullish | Signal::DonchianBreakout => regime.is_trend(),
            Signal::RsiOversold => regime == Regime::Ranging,
            _ => true,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signal::ALL
            .iter()
            .copied()
            .find(|sig| sig.as_str() == s)
            .ok_or_else(|| format!("unknown signal '{s}'"))
    }
}

/// Outcome of one signal on the decision bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Fired,
    NotFired,
    NotApplicable,
}

impl Verdict {
    fn from_bool(fired: bool) -> Self {
        if fired {
            Verdict::Fired
        } else {
            Verdict::NotFired
        }
    }

    /// Console marker: ✓ fired, ✗ not fired, – not applicable.
    pub fn marker(&self) -> char {
        match self {
            Verdict::Fired => '✓',
            Verdict::NotFired => '✗',
            Verdict::NotApplicable => '–',
        }
    }
}

/// Verdict for every signal, ordered like [`Signal::ALL`].
pub type SignalEvaluation = BTreeMap<Signal, Verdict>;

/// Every signal marked not applicable (exhaustion).
pub fn all_not_applicable() -> SignalEvaluation {
    Signal::ALL
        .iter()
        .map(|&s| (s, Verdict::NotApplicable))
        .collect()
}

fn or_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn fires(signal: Signal, row: &BarSnapshot) -> bool {
    match signal {
        Signal::MaAlignment => row.ma_alignment == MaAlignment::Bullish,
        Signal::PriceVsEma200 => row.price_vs_long == PriceLevel::Above,
        Signal::PriceVsEma50 => row.price_vs_medium == PriceLevel::Above,
        Signal::RegimeTrending => row.regime == Regime::Trending,
        Signal::DmiBullish => or_zero(row.di_plus) > or_zero(row.di_minus),
        Signal::PsarBullish => row.psar_bull,
        Signal::DonchianBreakout => row.donchian_breakout == Some(Breakout::Up),
        Signal::RsiAbove50 => row.rsi_above_50,
        Signal::RsiOversold => row.rsi_zone == Zone::Oversold,
        Signal::StochOversold => row.stoch_zone == Zone::Oversold,
        Signal::MacdCross => or_zero(row.macd) > or_zero(row.macd_signal),
        Signal::MacdHistRising => row.macd_hist_direction == Direction::Rising,
        Signal::MacdAboveZero => or_zero(row.macd) > 0.0,
        Signal::ObvRising => row.obv_trend == Direction::Rising,
        Signal::VolStrongBull => row.volume_price == Some(VolumePriceSignal::BullishStrong),
        Signal::VolAboveAvg => row.volume_above_average,
        Signal::BbSqueeze => row.bb_squeeze,
        Signal::BbPctLow => !row.bb_pct.is_nan() && row.bb_pct < 0.2,
    }
}

/// Evaluate every signal on the decision bar, gated by the bar's regime.
///
/// Exhaustion is not special-cased here; see [`crate::scoring::score_snapshot`].
pub fn evaluate_signals(row: &BarSnapshot) -> SignalEvaluation {
    Signal::ALL
        .iter()
        .map(|&signal| {
            let verdict = if signal.applies_in(row.regime) {
                Verdict::from_bool(fires(signal, row))
            } else {
                Verdict::NotApplicable
            };
            (signal, verdict)
        })
        .collect()
}
