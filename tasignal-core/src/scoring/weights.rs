//! Signal weights and tier thresholds.
//!
//! Thresholds are fractions of the weight total, so rescaling the weights
//! rescales the tiers with them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigError;
use crate::scoring::Signal;

/// Non-negative weight per signal. A signal missing from the table scores 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightTable {
    weights: BTreeMap<Signal, f64>,
}

impl Default for WeightTable {
    /// Binary scoring: every signal weighs 1.0.
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl WeightTable {
    pub fn uniform(weight: f64) -> Self {
        Self {
            weights: Signal::ALL.iter().map(|&s| (s, weight)).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    pub fn get(&self, signal: Signal) -> f64 {
        self.weights.get(&signal).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, signal: Signal, weight: f64) {
        self.weights.insert(signal, weight);
    }

    pub fn with(mut self, signal: Signal, weight: f64) -> Self {
        self.set(signal, weight);
        self
    }

    /// Score ceiling: the sum of all configured weights.
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Signal, f64)> + '_ {
        self.weights.iter().map(|(&s, &w)| (s, w))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (signal, weight) in self.iter() {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(ConfigError::NegativeWeight {
                    signal: signal.to_string(),
                    weight,
                });
            }
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightTable {
    type Error = String;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let weights = raw
            .into_iter()
            .map(|(name, weight)| Ok((name.parse::<Signal>()?, weight)))
            .collect::<Result<_, String>>()?;
        Ok(Self { weights })
    }
}

impl From<WeightTable> for BTreeMap<String, f64> {
    fn from(table: WeightTable) -> Self {
        table
            .weights
            .into_iter()
            .map(|(s, w)| (s.as_str().to_string(), w))
            .collect()
    }
}

/// Tier boundaries as fractions of the score ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// BUY / STARK at or above this share.
    pub strong: f64,
    /// BUY / MITTEL at or above this share.
    pub medium: f64,
    /// WATCH / SCHWACH at or above this share.
    pub watch: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            strong: 0.65,
            medium: 0.40,
            watch: 0.25,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 <= self.watch && self.watch <= self.medium && self.medium <= self.strong;
        if !(ordered && self.strong <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "scoring.thresholds".into(),
                reason: format!(
                    "need 0 <= watch ({}) <= medium ({}) <= strong ({}) <= 1",
                    self.watch, self.medium, self.strong
                ),
            });
        }
        Ok(())
    }
}

/// Weights plus thresholds, passed explicitly into the scorer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: WeightTable,
    pub thresholds: Thresholds,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.thresholds.validate()
    }
}
