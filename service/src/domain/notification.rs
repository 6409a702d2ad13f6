//! [`Notification`] and [`Interaction`] definitions.

use std::collections::BTreeSet;

use common::{define_id, define_kind, unit, DateTimeOf, Money};
#[cfg(doc)]
use common::DateTime;
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Buyer, RentListing, Renter, SaleListing};
use crate::domain::{agent, customer, listing};

/// Broadcast record created when a listing becomes accepted.
#[derive(Clone, Debug)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// [`Kind`] of this [`Notification`].
    pub kind: Kind,

    /// The entity this [`Notification`] is about.
    pub subject: Subject,

    /// ID of the [`agent::Agent`] whose action produced this
    /// [`Notification`].
    pub creator: agent::Id,

    /// Agents this [`Notification`] is addressed to.
    pub recipients: BTreeSet<agent::Id>,

    /// Agents who viewed this [`Notification`].
    pub viewed_by: BTreeSet<agent::Id>,

    /// Indicator whether this [`Notification`] is still active.
    pub active: bool,

    /// [`DateTime`] when this [`Notification`] was created.
    pub created_at: CreationDateTime,
}

impl Notification {
    /// Indicates whether the provided [`agent::Agent`] has this
    /// [`Notification`] pending.
    #[must_use]
    pub fn is_unread_by(&self, agent_id: agent::Id) -> bool {
        self.active
            && self.recipients.contains(&agent_id)
            && !self.viewed_by.contains(&agent_id)
    }
}

define_id! {
    #[doc = "ID of a [`Notification`]."]
    Id
}

define_kind! {
    #[doc = "Kind of a [`Notification`]."]
    enum Kind {
        #[doc = "A listing passed its acceptance verdict."]
        ListingAccepted = 1,
    }
}

/// The entity a [`Notification`] is about.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub enum Subject {
    /// A [`SaleListing`].
    SaleListing(listing::sale::Id),

    /// A [`RentListing`].
    RentListing(listing::rent::Id),
}

/// Suggestion dispatch between two agents.
#[derive(Clone, Debug)]
pub struct Interaction {
    /// ID of this [`Interaction`].
    pub id: InteractionId,

    /// ID of the sending [`agent::Agent`].
    pub sender: agent::Id,

    /// ID of the receiving [`agent::Agent`].
    pub receiver: agent::Id,

    /// Parent [`Notification`] this [`Interaction`] replies to, if any.
    pub notification_id: Option<Id>,

    /// Suggested entities carried by this [`Interaction`].
    pub items: Vec<Item>,

    /// [`DateTime`] when the receiver viewed this [`Interaction`], if they
    /// did.
    pub viewed_at: Option<ViewingDateTime>,

    /// [`DateTime`] when this [`Interaction`] was created.
    pub created_at: InteractionCreationDateTime,
}

impl Interaction {
    /// Indicates whether the provided [`agent::Agent`] has this
    /// [`Interaction`] pending.
    #[must_use]
    pub fn is_unread_by(&self, agent_id: agent::Id) -> bool {
        self.receiver == agent_id && self.viewed_at.is_none()
    }
}

define_id! {
    #[doc = "ID of an [`Interaction`]."]
    InteractionId
}

/// A single suggested entity inside an [`Interaction`], with the price and
/// area figures cached at send time.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Item {
    /// The suggested entity.
    pub target: Target,

    /// Price figure of the entity at send time.
    pub price: Money,

    /// Area figure of the entity at send time.
    pub area: listing::Area,
}

/// The entity a suggestion [`Item`] points at.
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

/// [`DateTime`] when a [`Notification`] was created.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;

/// [`DateTime`] when an [`Interaction`] was created.
pub type InteractionCreationDateTime =
    DateTimeOf<(Interaction, unit::Creation)>;

/// [`DateTime`] when an [`Interaction`] was viewed.
pub type ViewingDateTime = DateTimeOf<(Interaction, unit::Viewing)>;
