//! Categorical labels shared by several indicators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Oscillator zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Overbought,
    Oversold,
    #[default]
    Neutral,
}

impl Zone {
    /// Classify an oscillator value. NaN is neutral.
    pub fn classify(value: f64, overbought: f64, oversold: f64) -> Zone {
        if value >= overbought {
            Zone::Overbought
        } else if value <= oversold {
            Zone::Oversold
        } else {
            Zone::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Overbought => "overbought",
            Zone::Oversold => "oversold",
            Zone::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a series relative to a reference (its previous value or
/// its own moving average).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Rising,
    #[default]
    Falling,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Rising => "rising",
            Direction::Falling => "falling",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
