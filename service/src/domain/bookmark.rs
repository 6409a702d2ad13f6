//! [`Bookmark`] definitions.

use common::{define_id, define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Buyer, RentListing, Renter, SaleListing};
use crate::domain::{agent, customer, listing};

/// Per-agent save against one of the four primary entity kinds.
///
/// At most one [`Bookmark`] exists per `(agent, target)` pair.
#[derive(Clone, Debug)]
pub struct Bookmark {
    /// ID of this [`Bookmark`].
    pub id: Id,

    /// ID of the [`agent::Agent`] owning this [`Bookmark`].
    pub agent_id: agent::Id,

    /// [`Target`] of this [`Bookmark`].
    pub target: Target,

    /// [`DateTime`] when this [`Bookmark`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`Bookmark`]."]
    Id
}

/// Target of a [`Bookmark`]: exactly one of the four primary entity kinds.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub enum Target {
    /// A [`SaleListing`].
    SaleListing(listing::sale::Id),

    /// A [`RentListing`].
    RentListing(listing::rent::Id),

    /// A [`Buyer`].
    Buyer(customer::buyer::Id),

    /// A [`Renter`].
    Renter(customer::renter::Id),
}

define_kind! {
    #[doc = "Outcome of toggling a [`Bookmark`]."]
    enum Outcome {
        #[doc = "The bookmark was created."]
        Marked = 1,

        #[doc = "The bookmark existed and was removed."]
        Unmarked = 2,
    }
}

/// [`DateTime`] when a [`Bookmark`] was created.
pub type CreationDateTime = DateTimeOf<(Bookmark, unit::Creation)>;
