use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Non-negative money amount represented as **integer cents**.
///
/// Expenses never carry a sign, so the value is unsigned. On the wire the
/// amount is written as a decimal string with two fractional digits; when
/// reading, both JSON numbers and decimal strings are accepted because the
/// server returns whatever its storage hands back.
///
/// ```rust
/// use api_types::Amount;
///
/// assert_eq!("500".parse::<Amount>().unwrap().cents(), 50_000);
/// assert_eq!("12,5".parse::<Amount>().unwrap().to_string(), "12.50");
/// assert!("-1".parse::<Amount>().is_err());
/// assert!("12.345".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is required")]
    Empty,
    #[error("amount must not be negative")]
    Negative,
    #[error("amount must be a number")]
    Invalid,
    #[error("amount has too many decimals")]
    TooManyDecimals,
    #[error("amount too large")]
    Overflow,
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Converts a JSON float (major units) into cents, rounding to the
    /// nearest cent.
    fn from_major_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::Invalid);
        }
        if value < 0.0 {
            return Err(AmountError::Negative);
        }
        let cents = (value * 100.0).round();
        if cents > u64::MAX as f64 {
            return Err(AmountError::Overflow);
        }
        Ok(Self(cents as u64))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`.
    /// Rejects negative values and more than two fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountError::Negative);
        }
        let rest = trimmed.strip_prefix('+').unwrap_or(trimmed).trim();
        if rest.is_empty() {
            return Err(AmountError::Empty);
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or(AmountError::Invalid)?;
        let frac_str = parts.next();
        if parts.next().is_some() {
            return Err(AmountError::Invalid);
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(AmountError::Invalid);
        }
        let units: u64 = units_str.parse().map_err(|_| AmountError::Overflow)?;

        let cents: u64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AmountError::Invalid);
                }
                match frac.len() {
                    1 => frac.parse::<u64>().map_err(|_| AmountError::Invalid)? * 10,
                    2 => frac.parse::<u64>().map_err(|_| AmountError::Invalid)?,
                    _ => return Err(AmountError::TooManyDecimals),
                }
            }
        };

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal amount as number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        v.checked_mul(100)
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::Overflow))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        let v = u64::try_from(v).map_err(|_| E::custom(AmountError::Negative))?;
        self.visit_u64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_major_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_always_has_two_decimals() {
        assert_eq!(Amount::from_cents(0).to_string(), "0.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(50_000).to_string(), "500.00");
        assert_eq!(Amount::from_cents(1_250).to_string(), "12.50");
    }

    #[test]
    fn parse_accepts_dot_comma_and_plus() {
        assert_eq!("10".parse::<Amount>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Amount>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Amount>().unwrap().cents(), 1050);
        assert_eq!("+1.00".parse::<Amount>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<Amount>().unwrap().cents(), 230);
        assert_eq!("7.".parse::<Amount>().unwrap().cents(), 700);
    }

    #[test]
    fn parse_rejects_negative_and_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!("-0.01".parse::<Amount>(), Err(AmountError::Negative));
        assert_eq!("abc".parse::<Amount>(), Err(AmountError::Invalid));
        assert_eq!("1.2.3".parse::<Amount>(), Err(AmountError::Invalid));
        assert_eq!("12.345".parse::<Amount>(), Err(AmountError::TooManyDecimals));
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_int: Amount = serde_json::from_str("500").unwrap();
        let from_float: Amount = serde_json::from_str("12.5").unwrap();
        let from_str: Amount = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(from_int.cents(), 50_000);
        assert_eq!(from_float, from_str);
        assert!(serde_json::from_str::<Amount>("-3").is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Amount::from_cents(50_000)).unwrap();
        assert_eq!(json, "\"500.00\"");
    }
}
