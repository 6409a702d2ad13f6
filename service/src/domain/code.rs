//! Human-facing codes and opaque URL identifiers.

use std::str::FromStr;

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alphabet of an [`UrlId`].
const URL_ID_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Six-digit numeric code identifying an entity to humans.
///
/// Codes appear in printed documents and chat messages, so each entity
/// kind draws from its own 6-digit space. Uniqueness is enforced by the
/// storage unique index at persistence time: a collision surfaces as an
/// insertion failure and the creating command re-mints.
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
pub struct Code(String);

impl Code {
    /// Length of a [`Code`] in digits.
    pub const LEN: usize = 6;

    /// Creates a new [`Code`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Mints a fresh random [`Code`].
    #[must_use]
    pub fn mint() -> Self {
        let n = Uuid::new_v4().as_u128() % 1_000_000;
        Self(format!("{n:06}"))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.len() == Self::LEN
            && code.bytes().all(|b| b.is_ascii_digit())
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// Opaque 20-character identifier used in public URLs.
///
/// Listing galleries are keyed by an `(id, url_id)` pair so that the
/// numeric identifier alone is never enough to enumerate listings.
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
pub struct UrlId(String);

impl UrlId {
    /// Length of an [`UrlId`] in characters.
    pub const LEN: usize = 20;

    /// Creates a new [`UrlId`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `id` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a new [`UrlId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Mints a fresh random [`UrlId`].
    #[must_use]
    pub fn mint() -> Self {
        let mut n = Uuid::new_v4().as_u128();
        let mut out = String::with_capacity(Self::LEN);
        for _ in 0..Self::LEN {
            let digit = (n % 62) as usize;
            out.push(char::from(URL_ID_ALPHABET[digit]));
            n /= 62;
        }
        Self(out)
    }

    /// Checks whether the given `id` is a valid [`UrlId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.len() == Self::LEN
            && id.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl FromStr for UrlId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `UrlId`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Code, UrlId};

    #[test]
    fn code_format() {
        assert!(Code::new("123456").is_some());
        assert!(Code::new("000001").is_some());
        assert!(Code::new("12345").is_none());
        assert!(Code::new("1234567").is_none());
        assert!(Code::new("12345a").is_none());
    }

    #[test]
    fn minted_code_is_valid() {
        for _ in 0..64 {
            let code = Code::mint();
            assert!(Code::new(code.to_string()).is_some());
        }
    }

    #[test]
    fn minted_codes_spread() {
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..64 {
            let _ = seen.insert(Code::mint().to_string());
        }
        // 64 draws from a 10^6 space collide with negligible probability.
        assert!(seen.len() > 60);
    }

    #[test]
    fn url_id_format() {
        assert!(UrlId::new("A1b2C3d4E5f6G7h8I9j0").is_some());
        assert!(UrlId::new("A1b2C3d4E5f6G7h8I9j").is_none());
        assert!(UrlId::new("A1b2C3d4E5f6G7h8I9j!").is_none());
    }

    #[test]
    fn minted_url_id_is_valid() {
        for _ in 0..64 {
            let id = UrlId::mint();
            assert!(UrlId::new(id.to_string()).is_some());
        }
    }
}
