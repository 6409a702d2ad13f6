//! [`Renter`] definitions.

use std::collections::BTreeSet;

use common::{define_id, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    agent, approval,
    code::Code,
    customer::{Description, Name},
    listing::{
        rent::{Deposit, Rent},
        Age, Area, Features, Rooms,
    },
    location,
    phone::Phone,
};

/// Prospective renter of a rent apartment.
#[derive(Clone, Debug)]
pub struct Renter {
    /// ID of this [`Renter`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`Renter`], unique among renters.
    pub code: Code,

    /// ID of the [`agent::Agent`] serving this [`Renter`].
    pub agent_id: agent::Id,

    /// [`Name`] of this [`Renter`].
    pub name: Name,

    /// Unique [`Phone`] of this [`Renter`].
    pub phone: Phone,

    /// [`Description`] of this [`Renter`], if any.
    pub description: Option<Description>,

    /// Announced [`Deposit`] this [`Renter`] offers.
    pub announced_deposit: Deposit,

    /// Highest [`Deposit`] this [`Renter`] could stretch to.
    pub max_deposit: Deposit,

    /// Announced monthly [`Rent`] this [`Renter`] offers.
    pub announced_rent: Rent,

    /// Highest monthly [`Rent`] this [`Renter`] could stretch to.
    pub max_rent: Rent,

    /// Indicator whether this [`Renter`] accepts deposit/rent conversion.
    pub convertible: bool,

    /// Fewest rooms this [`Renter`] accepts.
    pub min_rooms: Rooms,

    /// Most rooms this [`Renter`] cares for.
    pub max_rooms: Rooms,

    /// Smallest [`Area`] this [`Renter`] accepts.
    pub min_area: Area,

    /// Largest [`Area`] this [`Renter`] cares for.
    pub max_area: Area,

    /// Lowest building [`Age`] this [`Renter`] accepts.
    pub min_age: Age,

    /// Highest building [`Age`] this [`Renter`] accepts.
    pub max_age: Age,

    /// [`Features`] this [`Renter`] filters by.
    pub features: Features,

    /// Home [`location::Path`] of this [`Renter`].
    pub home: location::Path,

    /// Sub-districts this [`Renter`] is interested in.
    pub interested_sub_districts: BTreeSet<location::sub_district::Id>,

    /// Approval [`Status`](approval::Status) of this [`Renter`].
    pub status: approval::Status,

    /// Indicator whether deletion of this [`Renter`] was requested.
    pub delete_requested: bool,

    /// [`DateTime`] when this [`Renter`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`Renter`]."]
    Id
}

/// [`DateTime`] when a [`Renter`] was created.
pub type CreationDateTime = DateTimeOf<(Renter, unit::Creation)>;
