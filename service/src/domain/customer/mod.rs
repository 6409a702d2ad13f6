//! [`Customer`] definitions.

pub mod buyer;
pub mod renter;

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display, From};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Agent;
use crate::domain::{agent, approval, code::Code, deal, location};

pub use self::{buyer::Buyer, renter::Renter};

/// Approval [`Status`](approval::Status) of a [`Customer`].
pub use crate::domain::approval::Status;

/// Prospective counterparty in a sale or rent deal.
#[derive(Clone, Debug, From)]
pub enum Customer {
    #[doc(hidden)]
    Buyer(Buyer),
    #[doc(hidden)]
    Renter(Renter),
}

impl Customer {
    /// Returns [`deal::Kind`] of this [`Customer`].
    #[must_use]
    pub fn kind(&self) -> deal::Kind {
        match self {
            Self::Buyer(_) => deal::Kind::Sale,
            Self::Renter(_) => deal::Kind::Rent,
        }
    }

    /// Returns the [`Code`] of this [`Customer`].
    #[must_use]
    pub fn code(&self) -> &Code {
        match self {
            Self::Buyer(c) => &c.code,
            Self::Renter(c) => &c.code,
        }
    }

    /// Returns the approval [`Status`] of this [`Customer`].
    #[must_use]
    pub fn status(&self) -> approval::Status {
        match self {
            Self::Buyer(c) => c.status,
            Self::Renter(c) => c.status,
        }
    }

    /// Returns ID of the [`Agent`] serving this [`Customer`].
    #[must_use]
    pub fn agent_id(&self) -> agent::Id {
        match self {
            Self::Buyer(c) => c.agent_id,
            Self::Renter(c) => c.agent_id,
        }
    }

    /// Returns the sub-districts this [`Customer`] is interested in.
    #[must_use]
    pub fn interested_sub_districts(
        &self,
    ) -> &std::collections::BTreeSet<location::sub_district::Id> {
        match self {
            Self::Buyer(c) => &c.interested_sub_districts,
            Self::Renter(c) => &c.interested_sub_districts,
        }
    }

    /// Indicates whether deletion of this [`Customer`] was requested.
    #[must_use]
    pub fn delete_requested(&self) -> bool {
        match self {
            Self::Buyer(c) => c.delete_requested,
            Self::Renter(c) => c.delete_requested,
        }
    }
}

/// Name of a [`Customer`], in the business script.
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

/// Free-form note on a [`Customer`].
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
