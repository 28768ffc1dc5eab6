//! Fixed-point product price, `NUMERIC(10, 2)` in storage and a two-decimal
//! string on the wire (`"19.90"`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub const PRECISION: u32 = 10;
pub const SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount rescaled to exactly two fractional digits.
    pub fn amount(&self) -> Decimal {
        let mut d = self.0;
        d.rescale(SCALE);
        d
    }

    /// Constraint failures for this amount, empty when it fits `NUMERIC(10, 2)`
    /// and is not negative.
    pub fn violations(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.0.is_sign_negative() && !self.0.is_zero() {
            out.push("This value should be either positive or zero.");
        }
        if self.0.normalize().scale() > SCALE {
            out.push("This value should have at most 2 fractional digits.");
        }
        let max = Decimal::from(10_i64.pow(PRECISION - SCALE));
        if self.0.abs().trunc() >= max {
            out.push("This value should have at most 10 digits in total.");
        }
        out
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.amount())
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s.trim()).map(Price)
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Price(d)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Numbers are accepted through their literal text so no binary float
        // rounding leaks into the amount.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        text.parse()
            .map_err(|_| de::Error::custom(format!("invalid decimal price {text:?}")))
    }
}
