//! [`Task`] definitions.

use std::str::FromStr;

use common::{calendar, define_id, define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Buyer, Renter, RentListing, SaleListing};
use crate::domain::{agent, code::Code, meeting::ResultText};

/// Work item assigned to an agent with a deadline.
#[derive(Clone, Debug)]
pub struct Task {
    /// ID of this [`Task`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`Task`], unique among tasks.
    pub code: Code,

    /// [`Title`] of this [`Task`].
    pub title: Title,

    /// [`Kind`] of this [`Task`].
    pub kind: Kind,

    /// ID of the [`agent::Agent`] assigned to this [`Task`].
    pub agent_id: agent::Id,

    /// Business-calendar day this [`Task`] is due on.
    pub deadline: calendar::Date,

    /// Listing this [`Task`] refers to, if any.
    pub listing: Option<ListingRef>,

    /// Customer this [`Task`] refers to, if any.
    pub customer: Option<CustomerRef>,

    /// Free-form description of this [`Task`], if any.
    pub description: Option<ResultText>,

    /// Outcome recorded by the assignee at delivery, if any.
    pub result: Option<ResultText>,

    /// [`Status`] of this [`Task`].
    pub status: Status,

    /// [`DateTime`] when this [`Task`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`Task`]."]
    Id
}

define_kind! {
    #[doc = "Kind of a [`Task`], deciding who may be assigned to it."]
    enum Kind {
        #[doc = "Listing-side work."]
        FileSide = 1,

        #[doc = "Customer-side work."]
        CustomerSide = 2,

        #[doc = "Work spanning both sides."]
        Dual = 3,
    }
}

define_kind! {
    #[doc = "Status of a [`Task`]."]
    enum Status {
        #[doc = "Open, awaiting the assignee's result."]
        Open = 1,

        #[doc = "Delivered: the assignee recorded a result."]
        Delivered = 2,

        #[doc = "Closed by the manager."]
        Closed = 3,
    }
}

impl Status {
    /// Indicates whether this [`Status`] may legally become the provided
    /// one.
    #[must_use]
    pub fn may_become(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Open, Self::Delivered) | (Self::Delivered, Self::Closed),
        )
    }

    /// Indicates whether this [`Status`] is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Reference of a [`Task`] to a listing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ListingRef {
    /// [`Code`] of a [`SaleListing`].
    Sale(Code),

    /// [`Code`] of a [`RentListing`].
    Rent(Code),
}

/// Reference of a [`Task`] to a customer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CustomerRef {
    /// [`Code`] of a [`Buyer`].
    Buyer(Code),

    /// [`Code`] of a [`Renter`].
    Renter(Code),
}

/// Title of a [`Task`].
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

/// [`DateTime`] when a [`Task`] was created.
pub type CreationDateTime = DateTimeOf<(Task, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn transitions() {
        use Status::{Closed, Delivered, Open};

        assert!(Open.may_become(Delivered));
        assert!(Delivered.may_become(Closed));

        assert!(!Open.may_become(Closed));
        assert!(!Delivered.may_become(Open));
        assert!(!Closed.may_become(Open));
        assert!(!Closed.may_become(Delivered));
    }
}
