use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Serialize, Serializer};

/// A fixed-point money amount with two fraction digits, stored as integer
/// cents. Arithmetic stays exact; only the savings-rate percentage ever
/// touches floating point. At the JSON boundary the amount serializes as
/// its decimal value, the same form the export payloads use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, utoipa::ToSchema,
)]
#[schema(value_type = f64)]
pub struct Money(pub i64);

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    /// Lossy float view, used only at the JSON export boundary.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse an amount from whatever the oracle produced: a JSON number,
    /// or a string like `"25.50"`. Anything unparseable is `None`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.checked_mul(100).map(Money)
                } else {
                    n.as_f64().map(Money::from_f64)
                }
            }
            serde_json::Value::String(s) => Self::parse_str(s),
            _ => None,
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        s.parse::<f64>().ok().filter(|f| f.is_finite()).map(Money::from_f64)
    }

    fn from_f64(f: f64) -> Self {
        Money((f * 100.0).round() as i64)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_oracle_values() {
        assert_eq!(Money::from_value(&json!("25.50")), Some(Money(2550)));
        assert_eq!(Money::from_value(&json!("3000")), Some(Money(300_000)));
        assert_eq!(Money::from_value(&json!(3000)), Some(Money(300_000)));
        assert_eq!(Money::from_value(&json!(9.0)), Some(Money(900)));
        assert_eq!(Money::from_value(&json!(null)), None);
        assert_eq!(Money::from_value(&json!("lunch")), None);
    }

    #[test]
    fn displays_two_fraction_digits() {
        assert_eq!(Money(2550).to_string(), "25.50");
        assert_eq!(Money(300_000).to_string(), "3000.00");
        assert_eq!(Money(5).to_string(), "0.05");
        assert_eq!(Money(-1250).to_string(), "-12.50");
    }

    #[test]
    fn serializes_as_decimal_amount() {
        assert_eq!(serde_json::to_value(Money(2550)).unwrap(), json!(25.5));
        assert_eq!(serde_json::to_value(Money(300_000)).unwrap(), json!(3000.0));
    }

    #[test]
    fn arithmetic_is_exact() {
        let balance = Money(300_000) - Money(50_000);
        assert_eq!(balance, Money(250_000));
        assert_eq!(balance.to_f64(), 2500.0);
    }
}
