//! [`Buyer`] definitions.

use std::collections::BTreeSet;

use common::{define_id, define_kind, unit, DateTimeOf, Money};
#[cfg(doc)]
use common::DateTime;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    agent, approval,
    code::Code,
    customer::{Description, Name},
    listing::{Age, Area, Features, Rooms},
    location,
    phone::Phone,
};

/// Prospective buyer of a sale apartment.
#[derive(Clone, Debug)]
pub struct Buyer {
    /// ID of this [`Buyer`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`Buyer`], unique among buyers.
    pub code: Code,

    /// ID of the [`agent::Agent`] serving this [`Buyer`].
    pub agent_id: agent::Id,

    /// [`Name`] of this [`Buyer`].
    pub name: Name,

    /// Unique [`Phone`] of this [`Buyer`].
    pub phone: Phone,

    /// [`Description`] of this [`Buyer`], if any.
    pub description: Option<Description>,

    /// Announced [`Budget`] of this [`Buyer`].
    pub announced_budget: Budget,

    /// Highest [`Budget`] this [`Buyer`] could stretch to.
    pub max_budget: Budget,

    /// How this [`Buyer`] funds the purchase.
    pub funding: Funding,

    /// Fewest rooms this [`Buyer`] accepts.
    pub min_rooms: Rooms,

    /// Most rooms this [`Buyer`] cares for.
    pub max_rooms: Rooms,

    /// Smallest [`Area`] this [`Buyer`] accepts.
    pub min_area: Area,

    /// Largest [`Area`] this [`Buyer`] cares for.
    pub max_area: Area,

    /// Lowest building [`Age`] this [`Buyer`] accepts.
    pub min_age: Age,

    /// Highest building [`Age`] this [`Buyer`] accepts.
    pub max_age: Age,

    /// [`Features`] this [`Buyer`] filters by.
    pub features: Features,

    /// Home [`location::Path`] of this [`Buyer`].
    pub home: location::Path,

    /// Sub-districts this [`Buyer`] is interested in.
    pub interested_sub_districts: BTreeSet<location::sub_district::Id>,

    /// Approval [`Status`](approval::Status) of this [`Buyer`].
    pub status: approval::Status,

    /// Indicator whether deletion of this [`Buyer`] was requested.
    pub delete_requested: bool,

    /// [`DateTime`] when this [`Buyer`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`Buyer`]."]
    Id
}

define_kind! {
    #[doc = "How a [`Buyer`] funds the purchase."]
    enum Funding {
        #[doc = "Fully in cash."]
        Cash = 1,

        #[doc = "Partially on credit."]
        Credit = 2,
    }
}

/// Purchase budget of a [`Buyer`], in toomans.
///
/// Budgets live in the sale price range, since they are compared against
/// announced sale prices.
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
pub struct Budget(Money);

impl Budget {
    /// Minimum supported [`Budget`], in toomans.
    pub const MIN: i64 = 1_000_000_000;

    /// Maximum supported [`Budget`], in toomans.
    pub const MAX: i64 = 1_000_000_000_000;

    /// Creates a new [`Budget`] if the given `amount` is in range.
    #[must_use]
    pub fn new(amount: Money) -> Option<Self> {
        let amount_dec = amount.amount();
        (amount_dec >= Decimal::from(Self::MIN)
            && amount_dec <= Decimal::from(Self::MAX))
        .then_some(Self(amount))
    }

    /// Returns the [`Money`] amount of this [`Budget`].
    #[must_use]
    pub const fn get(self) -> Money {
        self.0
    }
}

/// [`DateTime`] when a [`Buyer`] was created.
pub type CreationDateTime = DateTimeOf<(Buyer, unit::Creation)>;
