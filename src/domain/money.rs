use crate::error::{AdminError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

/// A monetary value in pesos.
///
/// Wraps `rust_decimal::Decimal` so fee and payment arithmetic stays exact.
/// Stored as an exact JSON number; quoted amounts are accepted on read.
/// Arithmetic is checked: an overflow is an error, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::arbitrary_precision")] pub Decimal);

/// Largest amount accepted as input (a fee base or a payment).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xa4c6_8000, 0x0003_8d7e, 0, false, 0);

fn out_of_range() -> AdminError {
    AdminError::validation("Amount too large")
}

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Builds an amount that must be strictly positive (payments, fee bases)
    /// and no larger than `MAX_AMOUNT`.
    pub fn positive(amount: Decimal) -> Result<Self> {
        if amount <= Decimal::ZERO {
            Err(AdminError::validation("Amount must be positive"))
        } else if amount > MAX_AMOUNT {
            Err(out_of_range())
        } else {
            Ok(Self(amount))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0.checked_add(rhs.0).map(Self).ok_or_else(out_of_range)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0.checked_sub(rhs.0).map(Self).ok_or_else(out_of_range)
    }

    /// Adds up `amounts`, failing instead of overflowing.
    pub fn try_sum<I>(amounts: I) -> Result<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// Formats as Argentine pesos: `$ 1.234,56`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}$ {grouped},{frac_part}")
    }
}

/// An ownership share of a consorcio, between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const FULL: Self = Self(Decimal::ONE_HUNDRED);

    pub fn new(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            Err(AdminError::validation(format!(
                "Percentage must be between 0 and 100, got {value}"
            )))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The share of `amount` this percentage represents, unrounded.
    pub fn share_of(&self, amount: Money) -> Result<Money> {
        amount
            .0
            .checked_mul(self.0)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .map(Money)
            .ok_or_else(out_of_range)
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = AdminError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

/// Stored as a JSON number, like `Money`.
impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        rust_decimal::serde::arbitrary_precision::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = rust_decimal::serde::arbitrary_precision::deserialize(deserializer)?;
        Percentage::new(value).map_err(de::Error::custom)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.0));
        let b = Money::new(dec!(5.0));
        assert_eq!(a.checked_add(b).unwrap(), Money::new(dec!(15.0)));
        assert_eq!(a.checked_sub(b).unwrap(), Money::new(dec!(5.0)));
        assert_eq!(Money::try_sum([a, b, b]).unwrap(), Money::new(dec!(20)));
        assert_eq!(Money::try_sum([]).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_money_overflow_is_an_error() {
        let max = Money::new(Decimal::MAX);
        assert!(matches!(
            max.checked_add(Money::new(dec!(1))),
            Err(AdminError::ValidationError(_))
        ));
        assert!(Money::try_sum([max, max]).is_err());
        assert!(Money::new(Decimal::MIN).checked_sub(max).is_err());
    }

    #[test]
    fn test_money_positive_validation() {
        assert!(Money::positive(dec!(1.0)).is_ok());
        assert!(matches!(
            Money::positive(dec!(0)),
            Err(AdminError::ValidationError(_))
        ));
        assert!(matches!(
            Money::positive(dec!(-3)),
            Err(AdminError::ValidationError(_))
        ));
        assert_eq!(MAX_AMOUNT, dec!(1_000_000_000_000_000));
        assert!(Money::positive(MAX_AMOUNT).is_ok());
        assert!(Money::positive(MAX_AMOUNT + dec!(0.01)).is_err());
        assert!(Money::positive(Decimal::MAX).is_err());
    }

    #[test]
    fn test_money_display_groups_thousands() {
        assert_eq!(Money::new(dec!(1234567.891)).to_string(), "$ 1.234.567,89");
        assert_eq!(Money::new(dec!(999)).to_string(), "$ 999,00");
        assert_eq!(Money::new(dec!(-1500.5)).to_string(), "-$ 1.500,50");
        assert_eq!(Money::ZERO.to_string(), "$ 0,00");
    }

    #[test]
    fn test_money_json_forms() {
        let json = serde_json::to_string(&Money::new(dec!(1500))).unwrap();
        assert_eq!(json, "1500");
        let json = serde_json::to_string(&Money::new(dec!(33333.33))).unwrap();
        assert_eq!(json, "33333.33");

        let parsed: Money = serde_json::from_str("1500.5").unwrap();
        assert_eq!(parsed, Money::new(dec!(1500.5)));
        let quoted: Money = serde_json::from_str("\"250\"").unwrap();
        assert_eq!(quoted, Money::new(dec!(250)));
    }

    #[test]
    fn test_percentage_json_forms() {
        let p = Percentage::new(dec!(33.33)).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "33.33");
        let parsed: Percentage = serde_json::from_str("25").unwrap();
        assert_eq!(parsed.value(), dec!(25));
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(Percentage::new(dec!(0)).is_ok());
        assert!(Percentage::new(dec!(100)).is_ok());
        assert!(Percentage::new(dec!(100.01)).is_err());
        assert!(Percentage::new(dec!(-1)).is_err());

        let parsed: serde_json::Result<Percentage> = serde_json::from_str("120");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_percentage_share_of() {
        let p = Percentage::new(dec!(12.5)).unwrap();
        assert_eq!(
            p.share_of(Money::new(dec!(1000))).unwrap(),
            Money::new(dec!(125))
        );
        assert!(
            Percentage::FULL
                .share_of(Money::new(Decimal::MAX))
                .is_err()
        );
    }
}
