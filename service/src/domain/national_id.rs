//! [`NationalId`] definitions.

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

/// Check-digit algorithm of a [`NationalId`].
///
/// [`Legacy`] reproduces the historical implementation, whose weighting
/// loop starts one step early and thereby folds the check digit itself
/// into the sum with weight `1`. [`Standard`] is the reference mod-11
/// algorithm.
///
/// [`Legacy`]: Algorithm::Legacy
/// [`Standard`]: Algorithm::Standard
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
pub enum Algorithm {
    /// Reference mod-11 check.
    #[default]
    Standard,

    /// Historical off-by-one check.
    Legacy,
}

/// National identity number of a person.
///
/// Ten digits, the last being a mod-11 check digit.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
pub struct NationalId(String);

impl NationalId {
    /// Creates a new [`NationalId`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`NationalId`] if the given `id` passes the provided
    /// [`Algorithm`]'s check.
    #[must_use]
    pub fn new(id: impl Into<String>, algorithm: Algorithm) -> Option<Self> {
        let id = id.into();
        Self::check(&id, algorithm).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`NationalId`] under the
    /// provided [`Algorithm`].
    fn check(id: impl AsRef<str>, algorithm: Algorithm) -> bool {
        let id = id.as_ref();
        if id.len() != 10 || !id.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }

        let digit = |i: usize| u32::from(id.as_bytes()[i] - b'0');
        let mut sum: u32 = (0..9).map(|i| digit(i) * (10 - i as u32)).sum();
        if matches!(algorithm, Algorithm::Legacy) {
            sum += digit(9);
        }

        let r = sum % 11;
        let check = if r < 2 { r } else { 11 - r };
        check == digit(9)
    }
}

#[cfg(test)]
mod spec {
    use super::{Algorithm, NationalId};

    #[test]
    fn accepts_valid_check_digit() {
        assert!(NationalId::new("0499370899", Algorithm::Standard).is_some());
    }

    #[test]
    fn rejects_flipped_check_digit() {
        assert!(NationalId::new("0499370890", Algorithm::Standard).is_none());
    }

    #[test]
    fn rejects_off_by_one_anywhere() {
        let valid = "0499370899";
        for i in 0..valid.len() {
            let mut bytes = valid.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'9' { b'8' } else { bytes[i] + 1 };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(
                NationalId::new(mutated, Algorithm::Standard).is_none(),
                "digit {i} flip must invalidate the check",
            );
        }
    }

    #[test]
    fn all_zeroes() {
        // The sum is zero, so the algorithm yields a zero check digit.
        assert!(NationalId::new("0000000000", Algorithm::Standard).is_some());
        assert!(NationalId::new("0000000001", Algorithm::Standard).is_none());
    }

    #[test]
    fn rejects_malformed() {
        assert!(NationalId::new("049937089", Algorithm::Standard).is_none());
        assert!(NationalId::new("04993708999", Algorithm::Standard).is_none());
        assert!(NationalId::new("049937089x", Algorithm::Standard).is_none());
    }

    #[test]
    fn legacy_differs_from_standard() {
        // Under the legacy weighting the check digit participates in its
        // own sum, so the two algorithms disagree on most inputs.
        assert!(NationalId::new("0499370899", Algorithm::Legacy).is_none());
        assert!(NationalId::new("0000000000", Algorithm::Legacy).is_some());
    }
}
