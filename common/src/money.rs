//! [`Money`]-related definitions.

use std::{fmt, ops, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Amount of money in toomans.
///
/// All monetary figures of the platform are tooman-denominated, so no
/// currency discriminator is carried around.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// [`Money`] amount of zero toomans.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] amount from the provided [`Decimal`].
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates a new [`Money`] amount from the provided whole toomans.
    #[must_use]
    pub fn from_toomans(toomans: i64) -> Self {
        Self(Decimal::from(toomans))
    }

    /// Returns the [`Decimal`] amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(amount) = self;
        if amount.is_integer() {
            write!(f, "{}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self).map_err(|_| "invalid amount")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45").unwrap(),
            Money::new(decimal("123.45")),
        );
        assert_eq!(
            Money::from_str("2000000000").unwrap(),
            Money::from_toomans(2_000_000_000),
        );

        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("12T").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::new(decimal("123.45")).to_string(), "123.45");
        assert_eq!(Money::new(decimal("123.00")).to_string(), "123");
        assert_eq!(Money::from_toomans(123).to_string(), "123");
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_toomans(200);
        let b = Money::from_toomans(50);

        assert_eq!(a + b, Money::from_toomans(250));
        assert_eq!(a - b, Money::from_toomans(150));
        assert_eq!(a * decimal("1.1"), Money::from_toomans(220));
        assert!(b < a);
    }
}
