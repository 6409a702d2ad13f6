//! [`Agent`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_id, define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::location;

/// Internal user operating the system.
#[derive(Clone, Debug)]
pub struct Agent {
    /// ID of this [`Agent`].
    pub id: Id,

    /// [`Username`] of this [`Agent`].
    pub username: Username,

    /// [`DisplayName`] of this [`Agent`].
    pub display_name: DisplayName,

    /// [`Role`] of this [`Agent`].
    pub role: Role,

    /// Home sub-district this [`Agent`] works in.
    pub sub_district: location::sub_district::Id,

    /// [`DateTime`] when this [`Agent`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Agent`] was deactivated, if it was.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Agent {
    /// Indicates whether this [`Agent`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

define_id! {
    #[doc = "ID of an [`Agent`]."]
    Id
}

define_kind! {
    #[doc = "Role of an [`Agent`], scoping what it may act upon."]
    enum Role {
        #[doc = "Works the listing side: files and manages listings."]
        FilePerson = 1,

        #[doc = "Works the customer side: buyers and renters."]
        CustomerPerson = 2,

        #[doc = "Coordinates visits and sessions between the two sides."]
        Coordinator = 3,

        #[doc = "Manages the agency: full authority, issues verdicts."]
        Manager = 4,

        #[doc = "Union of the file and customer sides."]
        Dual = 5,
    }
}

/// Username of an [`Agent`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Username(String);

impl Username {
    /// Creates a new [`Username`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `username` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    /// Creates a new [`Username`] if the given `username` is valid.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        Self::check(&username).then_some(Self(username))
    }

    /// Checks whether the given `username` is a valid [`Username`].
    fn check(username: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Username`] invariants:
        /// - Must consist of lowercase latin letters, digits, dots and
        ///   underscores;
        /// - Must be between 3 and 32 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[a-z0-9._]{3,32}$").expect("valid regex")
        });

        REGEX.is_match(username.as_ref())
    }
}

impl FromStr for Username {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

/// Display name of an [`Agent`], in the business script.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct DisplayName(String);

impl DisplayName {
    /// Creates a new [`DisplayName`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`DisplayName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`DisplayName`].
    fn check(name: impl AsRef<str>) -> bool {
        /// Regular expression checking [`DisplayName`] invariants:
        /// - Must consist of business script letters, whitespace and
        ///   zero-width non-joiners;
        /// - Must not be empty nor surrounded by whitespace.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\p{Arabic}[\p{Arabic}\s\u{200C}]*$")
                .expect("valid regex")
        });

        let name = name.as_ref();
        name.trim() == name && REGEX.is_match(name)
    }
}

impl FromStr for DisplayName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `DisplayName`")
    }
}

/// [`DateTime`] when an [`Agent`] was created.
pub type CreationDateTime = DateTimeOf<(Agent, unit::Creation)>;

/// [`DateTime`] when an [`Agent`] was deactivated.
pub type DeletionDateTime = DateTimeOf<(Agent, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use super::{DisplayName, Username};

    #[test]
    fn username_format() {
        assert!(Username::new("ali.rahimi").is_some());
        assert!(Username::new("agent_07").is_some());

        assert!(Username::new("ab").is_none());
        assert!(Username::new("With Space").is_none());
        assert!(Username::new("UPPER").is_none());
        assert!(Username::new("").is_none());
    }

    #[test]
    fn display_name_is_business_script() {
        assert!(DisplayName::new("\u{0639}\u{0644}\u{06CC}").is_some());
        assert!(DisplayName::new(
            "\u{0639}\u{0644}\u{06CC} \u{0631}\u{0636}\u{0627}"
        )
        .is_some());

        assert!(DisplayName::new("Ali").is_none());
        assert!(DisplayName::new("").is_none());
        assert!(DisplayName::new(" \u{0639}").is_none());
    }
}
