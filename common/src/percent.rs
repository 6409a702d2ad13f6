//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
use rust_decimal::Decimal;

/// Floating-point percentage.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] by checking the provided values is
    /// greater than `0` and less than `100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        if val < Decimal::ZERO || val > Decimal::ONE_HUNDRED {
            None
        } else {
            #[expect(
                clippy::allow_attributes,
                reason = "TODO: Remove once clippy is fixed"
            )]
            #[allow(unsafe_code, reason = "invariants checked already")]
            Some(unsafe { Self::new_unchecked(val) })
        }
    }

    /// Creates a new [`Percent`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must be greater than `0` and less than `100`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }

    /// Returns the given `base` increased by this [`Percent`].
    #[must_use]
    pub fn above(self, base: Decimal) -> Decimal {
        base * (Decimal::ONE + self.0 / Decimal::ONE_HUNDRED)
    }

    /// Returns the given `base` decreased by this [`Percent`].
    #[must_use]
    pub fn below(self, base: Decimal) -> Decimal {
        base * (Decimal::ONE - self.0 / Decimal::ONE_HUNDRED)
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::Percent;

    #[test]
    fn bands() {
        let twenty = Percent::new(Decimal::from(20)).unwrap();
        let base = Decimal::from(1000);

        assert_eq!(twenty.above(base), Decimal::from(1200));
        assert_eq!(twenty.below(base), Decimal::from(800));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Percent::new(Decimal::from(-1)).is_none());
        assert!(Percent::new(Decimal::from(101)).is_none());
        assert!(Percent::new(Decimal::from(100)).is_some());
        assert!(Percent::new(Decimal::ZERO).is_some());
    }
}
