use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument identity carried into every score result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Instrument {
    pub symbol: String,
    /// Display name; empty when the data source does not provide one.
    #[serde(default)]
    pub name: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// Instrument known only by its ticker symbol.
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        Self::new(symbol, "")
    }

    /// Name for display: the long name when known, the symbol otherwise.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{} ({})", self.symbol, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_falls_back_to_symbol() {
        let inst = Instrument::from_symbol("SAP");
        assert_eq!(inst.display_name(), "SAP");
        assert_eq!(inst.to_string(), "SAP");
    }

    #[test]
    fn display_includes_name() {
        let inst = Instrument::new("SAP", "SAP SE");
        assert_eq!(inst.display_name(), "SAP SE");
        assert_eq!(inst.to_string(), "SAP (SAP SE)");
    }

    #[test]
    fn name_defaults_when_missing_in_toml() {
        let inst: Instrument = toml::from_str("symbol = \"MSFT\"").unwrap();
        assert_eq!(inst, Instrument::from_symbol("MSFT"));
    }
}
