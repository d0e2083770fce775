//! Weighted score and tier classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Instrument;
use crate::frame::BarSnapshot;
use crate::indicators::Regime;
use crate::scoring::signal::{all_not_applicable, evaluate_signals, SignalEvaluation, Verdict};
use crate::scoring::weights::{ScoringConfig, Thresholds, WeightTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalTier {
    Buy,
    Watch,
    Neutral,
}

impl SignalTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalTier::Buy => "BUY",
            SignalTier::Watch => "WATCH",
            SignalTier::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for SignalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength within a tier. `None` renders as "–".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strength {
    #[serde(rename = "STARK")]
    Stark,
    #[serde(rename = "MITTEL")]
    Mittel,
    #[serde(rename = "SCHWACH")]
    Schwach,
    #[serde(rename = "–")]
    None,
}

impl Strength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Stark => "STARK",
            Strength::Mittel => "MITTEL",
            Strength::Schwach => "SCHWACH",
            Strength::None => "–",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sum of the weights of fired signals.
pub fn compute_score(signals: &SignalEvaluation, weights: &WeightTable) -> f64 {
    signals
        .iter()
        .filter(|(_, verdict)| **verdict == Verdict::Fired)
        .map(|(&signal, _)| weights.get(signal))
        .sum()
}

/// Map a score onto tiers relative to `ceiling`.
pub fn classify(score: f64, ceiling: f64, thresholds: &Thresholds) -> (SignalTier, Strength) {
    if ceiling <= 0.0 {
        return (SignalTier::Neutral, Strength::None);
    }
    let share = score / ceiling;
    if share >= thresholds.strong {
        (SignalTier::Buy, Strength::Stark)
    } else if share >= thresholds.medium {
        (SignalTier::Buy, Strength::Mittel)
    } else if share >= thresholds.watch {
        (SignalTier::Watch, Strength::Schwach)
    } else {
        (SignalTier::Neutral, Strength::None)
    }
}

/// Decision record for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub instrument: Instrument,
    pub date: NaiveDate,
    pub close: f64,
    pub regime: Regime,
    pub score: f64,
    /// Sum of all configured weights, gated or not.
    pub ceiling: f64,
    pub signal: SignalTier,
    pub strength: Strength,
    pub signals: SignalEvaluation,
}

impl ScoreResult {
    /// Score as a percentage of the ceiling (0 for a zero ceiling).
    pub fn percent(&self) -> f64 {
        if self.ceiling > 0.0 {
            self.score / self.ceiling * 100.0
        } else {
            0.0
        }
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.signals.values().filter(|v| **v == verdict).count()
    }
}

/// Score the decision bar.
///
/// An exhaustion regime short-circuits: every signal is not applicable,
/// the score is 0 and the result is NEUTRAL.
pub fn score_snapshot(instrument: Instrument, row: &BarSnapshot, config: &ScoringConfig) -> ScoreResult {
    let ceiling = config.weights.total();

    let (signals, score, (signal, strength)) = if row.regime == Regime::Exhaustion {
        (all_not_applicable(), 0.0, (SignalTier::Neutral, Strength::None))
    } else {
        let signals = evaluate_signals(row);
        let score = compute_score(&signals, &config.weights);
        let tiers = classify(score, ceiling, &config.thresholds);
        (signals, score, tiers)
    };

    ScoreResult {
        instrument,
        date: row.date,
        close: row.close,
        regime: row.regime,
        score,
        ceiling,
        signal,
        strength,
        signals,
    }
}
