//! Location hierarchy definitions.
//!
//! Locations form a four-level hierarchy: [`Province`] ⊃ [`City`] ⊃
//! [`District`] ⊃ [`SubDistrict`]. The sub-district is the unit of
//! territorial authorization: agents and customers are scoped by
//! sub-districts and cross-sub-district work is restricted.

use std::str::FromStr;

use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

/// Name of a location of any level.
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
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 128
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

pub mod province {
    //! [`Province`] identifiers.

    use common::define_id;

    define_id! {
        #[doc = "ID of a [`Province`](super::Province)."]
        Id
    }
}

pub mod city {
    //! [`City`] identifiers.

    use common::define_id;

    define_id! {
        #[doc = "ID of a [`City`](super::City)."]
        Id
    }
}

pub mod district {
    //! [`District`] identifiers.

    use common::define_id;

    define_id! {
        #[doc = "ID of a [`District`](super::District)."]
        Id
    }
}

pub mod sub_district {
    //! [`SubDistrict`] identifiers.

    use common::define_id;

    define_id! {
        #[doc = "ID of a [`SubDistrict`](super::SubDistrict)."]
        Id
    }
}

/// Top level of the location hierarchy.
#[derive(Clone, Debug)]
pub struct Province {
    /// ID of this [`Province`].
    pub id: province::Id,

    /// [`Name`] of this [`Province`].
    pub name: Name,

    /// When this [`Province`] was created.
    pub created_at: CreationDateTime,
}

/// City inside a [`Province`].
#[derive(Clone, Debug)]
pub struct City {
    /// ID of this [`City`].
    pub id: city::Id,

    /// ID of the [`Province`] this [`City`] belongs to.
    pub province_id: province::Id,

    /// [`Name`] of this [`City`].
    pub name: Name,

    /// When this [`City`] was created.
    pub created_at: CreationDateTime,
}

/// District inside a [`City`].
#[derive(Clone, Debug)]
pub struct District {
    /// ID of this [`District`].
    pub id: district::Id,

    /// ID of the [`City`] this [`District`] belongs to.
    pub city_id: city::Id,

    /// [`Name`] of this [`District`].
    pub name: Name,

    /// When this [`District`] was created.
    pub created_at: CreationDateTime,
}

/// Sub-district inside a [`District`]: the territorial authorization unit.
#[derive(Clone, Debug)]
pub struct SubDistrict {
    /// ID of this [`SubDistrict`].
    pub id: sub_district::Id,

    /// ID of the [`District`] this [`SubDistrict`] belongs to.
    pub district_id: district::Id,

    /// [`Name`] of this [`SubDistrict`].
    pub name: Name,

    /// When this [`SubDistrict`] was created.
    pub created_at: CreationDateTime,
}

/// Fully-resolved location of an entity, one ID per hierarchy level.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub struct Path {
    /// [`Province`] level of this [`Path`].
    pub province: province::Id,

    /// [`City`] level of this [`Path`].
    pub city: city::Id,

    /// [`District`] level of this [`Path`].
    pub district: district::Id,

    /// [`SubDistrict`] level of this [`Path`].
    pub sub_district: sub_district::Id,
}

/// [`DateTimeOf`] when a location was created.
pub type CreationDateTime = DateTimeOf<(Path, unit::Creation)>;
