//! Regime-aware composite scorer.
//!
//! The decision bar's indicator values are turned into a tri-state
//! [`SignalEvaluation`], the fired weights are summed, and the sum is
//! classified against thresholds expressed as shares of the weight total.

pub mod score;
pub mod signal;
pub mod weights;

pub use score::{classify, compute_score, score_snapshot, ScoreResult, SignalTier, Strength};
pub use signal::{all_not_applicable, evaluate_signals, Signal, SignalEvaluation, Verdict};
pub use weights::{ScoringConfig, Thresholds, WeightTable};
