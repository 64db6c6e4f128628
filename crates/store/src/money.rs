use std::{fmt, ops::Neg, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Signed money amount represented as **integer cents**.
///
/// The sign carries the direction of the movement:
/// - negative = expense
/// - positive = income / refund
///
/// Amounts are persisted as `amount_minor` (`BIGINT`) so no floating-point
/// rounding ever reaches the database.
///
/// ```rust
/// use store::MoneyCents;
///
/// assert_eq!("-10,5".parse::<MoneyCents>().unwrap().cents(), -1050);
/// assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Absolute value, saturating at `i64::MAX`.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(self.0.saturating_neg())
    }
}

impl FromStr for MoneyCents {
    type Err = StoreError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator, an optional leading sign and
    /// at most 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::validation(format!("invalid amount: '{}'", s.trim()));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed[1..].trim_start()),
            Some(b'+') => (false, trimmed[1..].trim_start()),
            _ => (false, trimmed),
        };

        let digits = digits.replace(',', ".");
        let (units, frac) = match digits.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (digits.as_str(), ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(frac) {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(StoreError::validation("too many decimals"));
        }

        let units: i64 = units.parse().map_err(|_| invalid())?;
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| StoreError::validation("amount too large"))?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}
