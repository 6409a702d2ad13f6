//! [`RentListing`] definitions.

use common::{define_id, unit, DateTimeOf, Money};
#[cfg(doc)]
use common::DateTime;
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    advertiser, agent, approval,
    code::{Code, UrlId},
    listing::{
        Address, Age, Area, Description, Features, Images, MediaPath, Rooms,
        Source, Title,
    },
    location,
};

/// Apartment offered for rent.
#[derive(Clone, Debug)]
pub struct RentListing {
    /// ID of this [`RentListing`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`RentListing`], unique among rent
    /// listings.
    pub code: Code,

    /// Opaque [`UrlId`] of this [`RentListing`] used in public URLs.
    pub url_id: UrlId,

    /// [`location::Path`] of this [`RentListing`].
    pub location: location::Path,

    /// Street [`Address`] of this [`RentListing`].
    pub address: Address,

    /// Announced [`Deposit`] of this [`RentListing`].
    pub announced_deposit: Deposit,

    /// Lowest [`Deposit`] the advertiser would settle for.
    pub floor_deposit: Deposit,

    /// Announced monthly [`Rent`] of this [`RentListing`].
    pub announced_rent: Rent,

    /// Lowest monthly [`Rent`] the advertiser would settle for.
    pub floor_rent: Rent,

    /// Indicator whether deposit and rent are convertible into each other.
    pub convertible: bool,

    /// Number of rooms.
    pub rooms: Rooms,

    /// [`Area`] of the apartment.
    pub area: Area,

    /// [`Age`] of the building.
    pub age: Age,

    /// Boolean [`Features`] of the apartment.
    pub features: Features,

    /// Gallery [`Images`] of this [`RentListing`].
    pub images: Images,

    /// Presentation video of this [`RentListing`], if any.
    pub video: Option<MediaPath>,

    /// [`Title`] of this [`RentListing`].
    pub title: Title,

    /// [`Description`] of this [`RentListing`], if any.
    pub description: Option<Description>,

    /// [`Source`] this [`RentListing`] was obtained from, if known.
    pub source: Option<Source>,

    /// ID of the [`advertiser::Advertiser`] owning the apartment.
    pub advertiser_id: advertiser::Id,

    /// ID of the [`agent::Agent`] who filed this [`RentListing`].
    pub agent_id: agent::Id,

    /// Approval [`Status`](approval::Status) of this [`RentListing`].
    pub status: approval::Status,

    /// Indicator whether deletion of this [`RentListing`] was requested.
    pub delete_requested: bool,

    /// [`DateTime`] when this [`RentListing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`RentListing`] was first accepted, if it
    /// was.
    pub accepted_at: Option<AcceptanceDateTime>,

    /// [`DateTime`] when this [`RentListing`] expires, stamped on its
    /// first acceptance.
    pub expires_at: Option<ExpiryDateTime>,
}

define_id! {
    #[doc = "ID of a [`RentListing`]."]
    Id
}

/// Rental deposit of an apartment, in toomans.
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
pub struct Deposit(Money);

impl Deposit {
    /// Maximum supported [`Deposit`], in toomans.
    pub const MAX: i64 = 100_000_000_000;

    /// Creates a new [`Deposit`] if the given `amount` is in range.
    #[must_use]
    pub fn new(amount: Money) -> Option<Self> {
        let amount_dec = amount.amount();
        (amount_dec >= Decimal::ZERO
            && amount_dec <= Decimal::from(Self::MAX))
        .then_some(Self(amount))
    }

    /// Returns the [`Money`] amount of this [`Deposit`].
    #[must_use]
    pub const fn get(self) -> Money {
        self.0
    }
}

/// Monthly rent of an apartment, in toomans.
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
pub struct Rent(Money);

impl Rent {
    /// Maximum supported monthly [`Rent`], in toomans.
    pub const MAX: i64 = 10_000_000_000;

    /// Creates a new [`Rent`] if the given `amount` is in range.
    #[must_use]
    pub fn new(amount: Money) -> Option<Self> {
        let amount_dec = amount.amount();
        (amount_dec >= Decimal::ZERO
            && amount_dec <= Decimal::from(Self::MAX))
        .then_some(Self(amount))
    }

    /// Returns the [`Money`] amount of this [`Rent`].
    #[must_use]
    pub const fn get(self) -> Money {
        self.0
    }
}

/// [`DateTime`] when a [`RentListing`] was created.
pub type CreationDateTime = DateTimeOf<(RentListing, unit::Creation)>;

/// [`DateTime`] when a [`RentListing`] was first accepted.
pub type AcceptanceDateTime = DateTimeOf<(RentListing, unit::Acceptance)>;

/// [`DateTime`] when a [`RentListing`] expires.
pub type ExpiryDateTime = DateTimeOf<(RentListing, unit::Expiry)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use super::{Deposit, Rent};

    #[test]
    fn deposit_bounds() {
        assert!(Deposit::new(Money::ZERO).is_some());
        assert!(Deposit::new(Money::from_toomans(Deposit::MAX)).is_some());
        assert!(Deposit::new(Money::from_toomans(-1)).is_none());
        assert!(Deposit::new(Money::from_toomans(Deposit::MAX + 1)).is_none());
    }

    #[test]
    fn rent_bounds() {
        assert!(Rent::new(Money::ZERO).is_some());
        assert!(Rent::new(Money::from_toomans(Rent::MAX)).is_some());
        assert!(Rent::new(Money::from_toomans(-1)).is_none());
        assert!(Rent::new(Money::from_toomans(Rent::MAX + 1)).is_none());
    }
}
