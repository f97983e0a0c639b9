use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Monetary value of an account line or balance.
/// It is using internally an i64 counting cents in order to avoid floating point rounding error.
/// The Amount precision is two places past the decimal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    store: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount parsing error: {0}")]
    Parse(String),

    #[error("Overflow error while creating Amount")]
    Overflow,

    #[error("Underflow error while creating Amount")]
    Underflow,
}

impl Amount {
    pub fn new() -> Self {
        Amount { store: 0 }
    }

    pub fn from_cents(cents: i64) -> Self {
        Amount { store: cents }
    }

    pub fn cents(&self) -> i64 {
        self.store
    }

    pub fn is_positive(&self) -> bool {
        self.store > 0
    }

    pub fn add(&self, other: &Amount) -> Result<Amount, AmountError> {
        match self.store.checked_add(other.store) {
            Some(total) => Ok(Amount { store: total }),
            None => Err(AmountError::Overflow)?,
        }
    }

    pub fn sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        match self.store.checked_sub(other.store) {
            Some(total) => Ok(Amount { store: total }),
            None => Err(AmountError::Underflow)?,
        }
    }

    /// Checked sum, failing on the first overflow
    pub fn sum<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Result<Amount, AmountError> {
        amounts
            .into_iter()
            .try_fold(Amount::new(), |total, amount| total.add(amount))
    }

    fn from_f64(value: f64) -> Result<Self, AmountError> {
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents > i64::MAX as f64 || cents < i64::MIN as f64 {
            Err(AmountError::Parse(value.to_string()))?
        }
        Ok(Amount {
            store: cents as i64,
        })
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts upstream currency text such as `$1,234.56`, `-$12.34` or `$-12.34`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // Sign may appear on either side of the currency symbol
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let (negative, rest) = match rest.strip_prefix('-') {
            Some(rest) if !negative => (true, rest),
            _ => (negative, rest),
        };

        let digits: String = rest.chars().filter(|c| *c != ',').collect();
        if digits.is_empty() || digits == "." {
            Err(AmountError::Parse(s.into()))?
        }

        let mut parts = digits.split('.');
        let left_part = parts.next().unwrap_or_default();
        let decimal_part = parts.next();

        // Checking for extra '.'
        if parts.next().is_some() {
            Err(AmountError::Parse(s.into()))?
        }

        // Checking if integer part is empty (ex: ".05")
        let left_str = if left_part.is_empty() { "0" } else { left_part };
        if !left_str.chars().all(|c| c.is_ascii_digit()) {
            Err(AmountError::Parse(s.into()))?
        }

        let whole = match left_str.parse::<i64>() {
            Ok(v) => match v.checked_mul(100) {
                Some(val) => val,
                None => Err(AmountError::Overflow)?,
            },
            Err(_) => Err(AmountError::Parse(s.into()))?,
        };

        let cents = match decimal_part {
            None => 0,
            Some(dec_str) => {
                if !dec_str.chars().all(|c| c.is_ascii_digit()) {
                    Err(AmountError::Parse(s.into()))?
                }

                // Ensure 2 digits for decimal part
                let mut dec_str = dec_str.to_owned();
                dec_str.truncate(2);
                while dec_str.len() < 2 {
                    dec_str.push('0');
                }

                dec_str
                    .parse::<i64>()
                    .map_err(|_| AmountError::Parse(s.into()))?
            }
        };

        let magnitude = whole.checked_add(cents).ok_or(AmountError::Overflow)?;
        let store = if negative { -magnitude } else { magnitude };

        Ok(Self { store })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.store;
        let abs_val = value.unsigned_abs();

        let left_part = abs_val / 100;
        let decimal_part = abs_val % 100;

        if value < 0 {
            write!(f, "-${}.{:02}", left_part, decimal_part)
        } else {
            write!(f, "${}.{:02}", left_part, decimal_part)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.cents() as f64 / 100.0)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a currency string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(100)
            .map(Amount::from_cents)
            .ok_or_else(|| E::custom(AmountError::Overflow))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Amount::from_cents)
            .ok_or_else(|| E::custom(AmountError::Overflow))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}
