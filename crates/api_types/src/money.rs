use std::{fmt, ops::Neg, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Signed money amount represented as **integer cents**.
///
/// Every monetary value (transaction amounts, account totals, medical
/// billing figures) uses this type so no value ever passes through a float.
///
/// On the wire an amount is a decimal string with two fractional digits
/// (`"12.34"`). Deserialization also accepts JSON numbers, which is what
/// most clients send.
///
/// ```rust
/// use api_types::Amount;
///
/// assert_eq!("10".parse::<Amount>().unwrap().cents(), 1000);
/// assert_eq!("-10,5".parse::<Amount>().unwrap().cents(), -1050);
/// assert!("12.345".parse::<Amount>().is_err());
/// assert_eq!(Amount::new(1234).to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must not be empty")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount has more than 2 decimal places: {0}")]
    TooPrecise(String),
    #[error("amount out of range: {0}")]
    Overflow(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Like [`Amount::checked_add`], reporting overflow as an error so sums
    /// of client supplied amounts can be propagated with `?`.
    pub fn try_add(self, rhs: Amount) -> Result<Amount, AmountError> {
        self.checked_add(rhs)
            .ok_or_else(|| AmountError::Overflow(format!("{self} + {rhs}")))
    }

    /// Checked sum of `amounts`.
    pub fn try_sum(amounts: impl IntoIterator<Item = Amount>) -> Result<Amount, AmountError> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.try_add(amount))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts an optional sign, `.` or `,` as decimal separator and at most
    /// two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, digits) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let normalized = digits.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (normalized.as_str(), ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if frac.len() > 2 {
            // Trailing zeros from float formatting ("1.500") are harmless.
            if frac[2..].bytes().any(|b| b != b'0') {
                return Err(AmountError::TooPrecise(s.to_string()));
            }
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::Overflow(s.to_string()))?
        };
        let frac_value: i64 = match frac.len() {
            0 => 0,
            1 => i64::from(frac.as_bytes()[0] - b'0') * 10,
            _ => i64::from(frac.as_bytes()[0] - b'0') * 10 + i64::from(frac.as_bytes()[1] - b'0'),
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(|| AmountError::Overflow(s.to_string()))?;

        Ok(Amount(if negative { -cents } else { cents }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most 2 fractional digits")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(100)
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::Overflow(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::Overflow(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // The shortest round-trip representation is what the client wrote.
        self.visit_str(&v.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_common_forms() {
        assert_eq!("0".parse::<Amount>().unwrap(), Amount::ZERO);
        assert_eq!("12.3".parse::<Amount>().unwrap().cents(), 1230);
        assert_eq!(".5".parse::<Amount>().unwrap().cents(), 50);
        assert_eq!("-0.01".parse::<Amount>().unwrap().cents(), -1);
        assert_eq!("+7,25".parse::<Amount>().unwrap().cents(), 725);
        assert_eq!("1.500".parse::<Amount>().unwrap().cents(), 150);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert!(matches!(
            "1.234".parse::<Amount>(),
            Err(AmountError::TooPrecise(_))
        ));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("-".parse::<Amount>(), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn display_pads_cents() {
        assert_eq!(Amount::new(5).to_string(), "0.05");
        assert_eq!(Amount::new(-120).to_string(), "-1.20");
        assert_eq!(Amount::new(100_000).to_string(), "1000.00");
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let from_float: Amount = serde_json::from_str("12.34").unwrap();
        let from_int: Amount = serde_json::from_str("12").unwrap();
        let from_str: Amount = serde_json::from_str("\"-3.10\"").unwrap();
        assert_eq!(from_float.cents(), 1234);
        assert_eq!(from_int.cents(), 1200);
        assert_eq!(from_str.cents(), -310);
        assert!(serde_json::from_str::<Amount>("0.001").is_err());
    }

    #[test]
    fn checked_sums_report_overflow() {
        let half = Amount::new(i64::MAX / 2 + 1);
        assert!(half.checked_add(half).is_none());
        assert!(matches!(half.try_add(half), Err(AmountError::Overflow(_))));
        assert_eq!(
            Amount::new(150).try_add(Amount::new(-50)).unwrap(),
            Amount::new(100)
        );
        assert_eq!(
            Amount::try_sum([Amount::new(1), Amount::new(2), Amount::new(3)]).unwrap(),
            Amount::new(6)
        );
        assert_eq!(Amount::try_sum(Vec::new()).unwrap(), Amount::ZERO);
        assert!(Amount::try_sum([half, Amount::new(1), half]).is_err());
    }

    #[test]
    fn json_serializes_as_string() {
        let json = serde_json::to_string(&Amount::new(99)).unwrap();
        assert_eq!(json, "\"0.99\"");
    }
}
