use serde::{Deserialize, Serialize};

use crate::{MoneyCents, StoreError};

/// Direction of a money movement as declared by the caller.
///
/// The stored amount is signed, so the flow only decides the sign: income and
/// refunds are positive, expenses negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Income,
    Refund,
    Expense,
}

impl Flow {
    /// Apply the flow to `amount`, returning the signed amount to store.
    ///
    /// Without an explicit flow the sign of `amount` is kept as given.
    pub fn signed(flow: Option<Flow>, amount: MoneyCents) -> MoneyCents {
        match flow {
            Some(Self::Income | Self::Refund) => amount.abs(),
            Some(Self::Expense) => -amount.abs(),
            None => amount,
        }
    }
}

impl TryFrom<&str> for Flow {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "refund" => Ok(Self::Refund),
            "expense" => Ok(Self::Expense),
            other => Err(StoreError::validation(format!("invalid flow: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_forces_the_sign() {
        let amount = MoneyCents::new(-500);
        assert_eq!(Flow::signed(Some(Flow::Income), amount).cents(), 500);
        assert_eq!(Flow::signed(Some(Flow::Refund), amount).cents(), 500);
        assert_eq!(
            Flow::signed(Some(Flow::Expense), MoneyCents::new(500)).cents(),
            -500
        );
        assert_eq!(Flow::signed(None, amount).cents(), -500);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(Flow::try_from(" Refund ").unwrap(), Flow::Refund);
        assert!(Flow::try_from("gift").is_err());
    }
}
