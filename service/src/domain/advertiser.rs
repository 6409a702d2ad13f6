//! [`Advertiser`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_id, unit, DateTimeOf};
use derive_more::{AsRef, Display};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{approval, phone::Phone};

/// External owner of a listed apartment.
///
/// Recorded as a contact, not a user: the [`Phone`] is the identity and is
/// unique across advertisers.
#[derive(Clone, Debug)]
pub struct Advertiser {
    /// ID of this [`Advertiser`].
    pub id: Id,

    /// [`Name`] of this [`Advertiser`].
    pub name: Name,

    /// Unique [`Phone`] of this [`Advertiser`].
    pub phone: Phone,

    /// [`Description`] of this [`Advertiser`], if any.
    pub description: Option<Description>,

    /// Approval [`Status`](approval::Status) of this [`Advertiser`].
    pub status: approval::Status,

    /// Indicator whether deletion of this [`Advertiser`] was requested.
    pub delete_requested: bool,

    /// [`DateTime`] when this [`Advertiser`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of an [`Advertiser`]."]
    Id
}

/// Name of an [`Advertiser`], in the business script.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Name`] invariants: business script
        /// letters, whitespace and zero-width non-joiners only.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\p{Arabic}[\p{Arabic}\s\u{200C}]*$")
                .expect("valid regex")
        });

        let name = name.as_ref();
        name.trim() == name && REGEX.is_match(name)
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Description of an [`Advertiser`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 1024
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// [`DateTime`] when an [`Advertiser`] was created.
pub type CreationDateTime = DateTimeOf<(Advertiser, unit::Creation)>;
