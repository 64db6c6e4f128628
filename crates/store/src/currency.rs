use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Currencies a tenant or an expense may be recorded in.
///
/// Codes are stored lowercase (`"usd"`). No conversion between them is ever
/// performed: an amount is always read back in the currency it was written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Argentine peso.
    Ars,
    /// US dollar.
    #[default]
    Usd,
    /// Euro.
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Ars, Currency::Usd, Currency::Eur];

    /// Canonical (stored) currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Ars => "ars",
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_lowercase();
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| {
                let supported: Vec<_> = Currency::ALL.iter().map(|c| c.code()).collect();
                StoreError::validation(format!(
                    "unsupported currency: {code}, expected one of {}",
                    supported.join(", ")
                ))
            })
    }
}

impl core::str::FromStr for Currency {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Currency::try_from("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::try_from(" ars ").unwrap(), Currency::Ars);
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::Eur);
    }

    #[test]
    fn parse_rejects_unsupported() {
        let err = Currency::try_from("gbp").unwrap_err();
        assert_eq!(
            err,
            StoreError::Validation(
                "unsupported currency: gbp, expected one of ars, usd, eur".to_string()
            )
        );
    }

    #[test]
    fn every_code_parses_back() {
        for currency in Currency::ALL {
            assert_eq!(Currency::try_from(currency.code()).unwrap(), currency);
        }
    }
}
