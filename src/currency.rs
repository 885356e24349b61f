//! Currency model for the earnings pipeline.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Currencies the pipeline knows about. Platforms pay out in USD or EUR;
/// BRL is the base display currency everything can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Brl,
}

/// The only currency a foreign amount can be converted into. A display
/// currency that is neither a record's native currency nor this base has no
/// cross-rate and such records are excluded from the view.
pub const BASE_CURRENCY: Currency = Currency::Brl;

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Currency::Usd => "USD",
                Currency::Eur => "EUR",
                Currency::Brl => "BRL",
            }
        )
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "BRL" => Ok(Currency::Brl),
            _ => Err(anyhow::anyhow!("Unsupported currency: {}", s)),
        }
    }
}

impl Currency {
    /// Symbol used when formatting amounts for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Brl => "R$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_round_trip() {
        for cur in [Currency::Usd, Currency::Eur, Currency::Brl] {
            assert_eq!(cur.to_string().parse::<Currency>().unwrap(), cur);
        }
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert!("GBP".parse::<Currency>().is_err());
    }
}
