//! [`Listing`] definitions.

pub mod rent;
pub mod sale;

use std::str::FromStr;

use common::define_kind;
use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Agent;
use crate::domain::{agent, approval, code::Code, deal, location};

pub use self::{rent::RentListing, sale::SaleListing};

/// Approval [`Status`](approval::Status) of a [`Listing`].
pub use crate::domain::approval::Status;

/// Sale or rent apartment offering.
#[derive(Clone, Debug, From)]
pub enum Listing {
    #[doc(hidden)]
    Sale(SaleListing),
    #[doc(hidden)]
    Rent(RentListing),
}

impl Listing {
    /// Returns [`deal::Kind`] of this [`Listing`].
    #[must_use]
    pub fn kind(&self) -> deal::Kind {
        match self {
            Self::Sale(_) => deal::Kind::Sale,
            Self::Rent(_) => deal::Kind::Rent,
        }
    }

    /// Returns the [`Code`] of this [`Listing`].
    #[must_use]
    pub fn code(&self) -> &Code {
        match self {
            Self::Sale(l) => &l.code,
            Self::Rent(l) => &l.code,
        }
    }

    /// Returns the approval [`Status`] of this [`Listing`].
    #[must_use]
    pub fn status(&self) -> approval::Status {
        match self {
            Self::Sale(l) => l.status,
            Self::Rent(l) => l.status,
        }
    }

    /// Returns the [`location::Path`] of this [`Listing`].
    #[must_use]
    pub fn location(&self) -> location::Path {
        match self {
            Self::Sale(l) => l.location,
            Self::Rent(l) => l.location,
        }
    }

    /// Returns ID of the [`Agent`] who filed this [`Listing`].
    #[must_use]
    pub fn agent_id(&self) -> agent::Id {
        match self {
            Self::Sale(l) => l.agent_id,
            Self::Rent(l) => l.agent_id,
        }
    }

    /// Indicates whether deletion of this [`Listing`] was requested.
    #[must_use]
    pub fn delete_requested(&self) -> bool {
        match self {
            Self::Sale(l) => l.delete_requested,
            Self::Rent(l) => l.delete_requested,
        }
    }
}

define_kind! {
    #[doc = "Source a [`Listing`] was obtained from."]
    enum Source {
        #[doc = "Filed directly by an agent."]
        Agency = 1,

        #[doc = "Found on a public advertisement platform."]
        Advertisement = 2,

        #[doc = "Referred by an acquaintance of the agency."]
        Referral = 3,
    }
}

/// Title of a [`Listing`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 256
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Free-form description of a [`Listing`].
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
            && description.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Street address of a [`Listing`], below its sub-district.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address
            && !address.is_empty()
            && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// Number of rooms in an apartment.
#[derive(
    Clone,
    Copy,
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
pub struct Rooms(u8);

impl Rooms {
    /// Maximum supported number of rooms.
    pub const MAX: u8 = 20;

    /// Creates a new [`Rooms`] count if the given `rooms` is in range.
    #[must_use]
    pub fn new(rooms: u8) -> Option<Self> {
        (rooms <= Self::MAX).then_some(Self(rooms))
    }

    /// Returns the raw count of this [`Rooms`].
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Area of an apartment in square meters.
#[derive(
    Clone,
    Copy,
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
pub struct Area(u32);

impl Area {
    /// Minimum supported [`Area`], in square meters.
    pub const MIN: u32 = 20;

    /// Maximum supported [`Area`], in square meters.
    pub const MAX: u32 = 100_000;

    /// Creates a new [`Area`] if the given `square_meters` is in range.
    #[must_use]
    pub fn new(square_meters: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&square_meters)
            .then_some(Self(square_meters))
    }

    /// Returns the raw square meters of this [`Area`].
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Age of a building in years.
#[derive(
    Clone,
    Copy,
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
pub struct Age(u8);

impl Age {
    /// Maximum supported [`Age`], in years.
    pub const MAX: u8 = 150;

    /// Creates a new [`Age`] if the given `years` is in range.
    #[must_use]
    pub fn new(years: u8) -> Option<Self> {
        (years <= Self::MAX).then_some(Self(years))
    }

    /// Returns the raw years of this [`Age`].
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Boolean features of an apartment.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub struct Features {
    /// Indicator whether the ownership document is available.
    pub document: bool,

    /// Indicator whether a parking lot is available.
    pub parking: bool,

    /// Indicator whether an elevator is available.
    pub elevator: bool,

    /// Indicator whether a warehouse is available.
    pub warehouse: bool,
}

/// Path of an uploaded media file, relative to the configured media root.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct MediaPath(String);

impl MediaPath {
    /// Creates a new [`MediaPath`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `path` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Creates a new [`MediaPath`] if the given `path` is valid.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        Self::check(&path).then_some(Self(path))
    }

    /// Checks whether the given `path` is a valid [`MediaPath`].
    fn check(path: impl AsRef<str>) -> bool {
        let path = path.as_ref();
        !path.is_empty()
            && path.len() <= 512
            && !path.starts_with('/')
            && path.split('/').all(|seg| !seg.is_empty() && seg != "..")
    }
}

impl FromStr for MediaPath {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `MediaPath`")
    }
}

/// Gallery images of a [`Listing`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Images(Vec<MediaPath>);

impl Images {
    /// Maximum number of gallery images per [`Listing`].
    pub const MAX: usize = 9;

    /// Creates a new [`Images`] gallery if the given `images` fit the
    /// gallery size.
    #[must_use]
    pub fn new(images: Vec<MediaPath>) -> Option<Self> {
        (images.len() <= Self::MAX).then_some(Self(images))
    }

    /// Returns the images of this gallery.
    #[must_use]
    pub fn as_slice(&self) -> &[MediaPath] {
        &self.0
    }

    /// Returns the number of images in this gallery.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether this gallery is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod spec {
    use super::{Area, Images, MediaPath, Rooms};

    #[test]
    fn area_bounds() {
        assert!(Area::new(20).is_some());
        assert!(Area::new(100_000).is_some());
        assert!(Area::new(19).is_none());
        assert!(Area::new(100_001).is_none());
    }

    #[test]
    fn rooms_bounds() {
        assert!(Rooms::new(0).is_some());
        assert!(Rooms::new(20).is_some());
        assert!(Rooms::new(21).is_none());
    }

    #[test]
    fn gallery_caps_at_nine() {
        let image = MediaPath::new("listings/1.jpg").unwrap();
        assert!(Images::new(vec![image.clone(); 9]).is_some());
        assert!(Images::new(vec![image; 10]).is_none());
    }

    #[test]
    fn media_path_stays_under_root() {
        assert!(MediaPath::new("listings/1.jpg").is_some());
        assert!(MediaPath::new("/etc/passwd").is_none());
        assert!(MediaPath::new("a/../b").is_none());
        assert!(MediaPath::new("").is_none());
    }
}
