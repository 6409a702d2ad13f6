//! [`ReviewTask`] definitions.

use common::{define_id, define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{
    Advertiser, Buyer, Meeting, RentListing, Renter, SaleListing, Task,
};
use crate::domain::{
    advertiser, customer, listing, meeting, task,
};

/// Manager-facing companion item coupled to a significant entity.
///
/// Exactly one open [`ReviewTask`] of the matching [`Kind`] exists per
/// significant entity; closing it is only legal jointly with the paired
/// entity's own transition.
#[derive(Clone, Debug)]
pub struct ReviewTask {
    /// ID of this [`ReviewTask`].
    pub id: Id,

    /// Human-facing [`Code`](crate::domain::Code) of this [`ReviewTask`],
    /// unique among review tasks.
    pub code: crate::domain::Code,

    /// [`Kind`] of this [`ReviewTask`].
    pub kind: Kind,

    /// [`Condition`] of this [`ReviewTask`].
    pub condition: Condition,

    /// The entity this [`ReviewTask`] mirrors.
    pub subject: Subject,

    /// [`DateTime`] when this [`ReviewTask`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`ReviewTask`]."]
    Id
}

define_kind! {
    #[doc = "Kind of a [`ReviewTask`]."]
    enum Kind {
        #[doc = "A new [`SaleListing`] awaits a verdict."]
        NewSaleListing = 1,

        #[doc = "A new [`RentListing`] awaits a verdict."]
        NewRentListing = 2,

        #[doc = "A new [`Buyer`] awaits a verdict."]
        NewBuyer = 3,

        #[doc = "A new [`Renter`] awaits a verdict."]
        NewRenter = 4,

        #[doc = "A new [`Advertiser`] awaits a verdict."]
        NewAdvertiser = 5,

        #[doc = "A new visit awaits an acceptance verdict."]
        NewVisit = 6,

        #[doc = "A new session awaits an acceptance verdict."]
        NewSession = 7,

        #[doc = "A visit result awaits confirmation."]
        VisitResult = 8,

        #[doc = "A session result awaits confirmation."]
        SessionResult = 9,

        #[doc = "A delivered [`Task`] awaits closure."]
        TaskDelivery = 10,
    }
}

define_kind! {
    #[doc = "Condition of a [`ReviewTask`]."]
    enum Condition {
        #[doc = "Open, awaiting the manager."]
        Open = 1,

        #[doc = "Closed by the manager."]
        Closed = 2,
    }
}

/// The entity a [`ReviewTask`] mirrors.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub enum Subject {
    /// A [`SaleListing`].
    SaleListing(listing::sale::Id),

    /// A [`RentListing`].
    RentListing(listing::rent::Id),

    /// A [`Buyer`].
    Buyer(customer::buyer::Id),

    /// A [`Renter`].
    Renter(customer::renter::Id),

    /// An [`Advertiser`].
    Advertiser(advertiser::Id),

    /// A [`Meeting`] (visit or session).
    Meeting(meeting::Id),

    /// A [`Task`].
    Task(task::Id),
}

/// [`DateTime`] when a [`ReviewTask`] was created.
pub type CreationDateTime = DateTimeOf<(ReviewTask, unit::Creation)>;
