//! [`Phone`] number definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

/// Mobile phone number of a contact.
///
/// Exactly 11 digits, prefixed with `09`, with the third digit limited to
/// the `0..=3` operator range.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `phone` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    /// Creates a new [`Phone`] if the given `phone` is valid.
    #[must_use]
    pub fn new(phone: impl Into<String>) -> Option<Self> {
        let phone = phone.into();
        Self::check(&phone).then_some(Self(phone))
    }

    /// Checks whether the given `phone` is a valid [`Phone`].
    fn check(phone: impl AsRef<str>) -> bool {
        let phone = phone.as_ref();
        phone.len() == 11
            && phone.bytes().all(|b| b.is_ascii_digit())
            && phone.starts_with("09")
            && matches!(phone.as_bytes()[2], b'0'..=b'3')
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

#[cfg(test)]
mod spec {
    use super::Phone;

    #[test]
    fn accepts_operator_range() {
        assert!(Phone::new("09012345678").is_some());
        assert!(Phone::new("09123456789").is_some());
        assert!(Phone::new("09351234567").is_some());
    }

    #[test]
    fn rejects_out_of_range_operator() {
        assert!(Phone::new("09412345678").is_none());
        assert!(Phone::new("09912345678").is_none());
    }

    #[test]
    fn rejects_malformed() {
        assert!(Phone::new("0901234567").is_none());
        assert!(Phone::new("090123456789").is_none());
        assert!(Phone::new("08012345678").is_none());
        assert!(Phone::new("0901234567a").is_none());
        assert!(Phone::new("").is_none());
    }
}
