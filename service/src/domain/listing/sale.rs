//! [`SaleListing`] definitions.

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

/// Apartment offered for sale.
#[derive(Clone, Debug)]
pub struct SaleListing {
    /// ID of this [`SaleListing`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`SaleListing`], unique among sale
    /// listings.
    pub code: Code,

    /// Opaque [`UrlId`] of this [`SaleListing`] used in public URLs.
    pub url_id: UrlId,

    /// [`location::Path`] of this [`SaleListing`].
    pub location: location::Path,

    /// Street [`Address`] of this [`SaleListing`].
    pub address: Address,

    /// Announced [`Price`] of this [`SaleListing`].
    pub announced_price: Price,

    /// Lowest [`Price`] the advertiser would settle for.
    pub floor_price: Price,

    /// Number of rooms.
    pub rooms: Rooms,

    /// [`Area`] of the apartment.
    pub area: Area,

    /// [`Age`] of the building.
    pub age: Age,

    /// Boolean [`Features`] of the apartment.
    pub features: Features,

    /// Gallery [`Images`] of this [`SaleListing`].
    pub images: Images,

    /// Presentation video of this [`SaleListing`], if any.
    pub video: Option<MediaPath>,

    /// [`Title`] of this [`SaleListing`].
    pub title: Title,

    /// [`Description`] of this [`SaleListing`], if any.
    pub description: Option<Description>,

    /// [`Source`] this [`SaleListing`] was obtained from, if known.
    pub source: Option<Source>,

    /// ID of the [`advertiser::Advertiser`] owning the apartment.
    pub advertiser_id: advertiser::Id,

    /// ID of the [`agent::Agent`] who filed this [`SaleListing`].
    pub agent_id: agent::Id,

    /// Approval [`Status`](approval::Status) of this [`SaleListing`].
    pub status: approval::Status,

    /// Indicator whether deletion of this [`SaleListing`] was requested.
    pub delete_requested: bool,

    /// [`DateTime`] when this [`SaleListing`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`SaleListing`] was first accepted, if it
    /// was.
    pub accepted_at: Option<AcceptanceDateTime>,

    /// [`DateTime`] when this [`SaleListing`] expires, stamped on its
    /// first acceptance.
    pub expires_at: Option<ExpiryDateTime>,
}

define_id! {
    #[doc = "ID of a [`SaleListing`]."]
    Id
}

/// Sale price of an apartment, in toomans.
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
pub struct Price(Money);

impl Price {
    /// Minimum supported [`Price`], in toomans.
    pub const MIN: i64 = 1_000_000_000;

    /// Maximum supported [`Price`], in toomans.
    pub const MAX: i64 = 1_000_000_000_000;

    /// Creates a new [`Price`] if the given `amount` is in range.
    #[must_use]
    pub fn new(amount: Money) -> Option<Self> {
        let amount_dec = amount.amount();
        (amount_dec >= Decimal::from(Self::MIN)
            && amount_dec <= Decimal::from(Self::MAX))
        .then_some(Self(amount))
    }

    /// Returns the [`Money`] amount of this [`Price`].
    #[must_use]
    pub const fn get(self) -> Money {
        self.0
    }
}

/// [`DateTime`] when a [`SaleListing`] was created.
pub type CreationDateTime = DateTimeOf<(SaleListing, unit::Creation)>;

/// [`DateTime`] when a [`SaleListing`] was first accepted.
pub type AcceptanceDateTime = DateTimeOf<(SaleListing, unit::Acceptance)>;

/// [`DateTime`] when a [`SaleListing`] expires.
pub type ExpiryDateTime = DateTimeOf<(SaleListing, unit::Expiry)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use super::Price;

    #[test]
    fn price_bounds() {
        assert!(Price::new(Money::from_toomans(Price::MIN)).is_some());
        assert!(Price::new(Money::from_toomans(Price::MAX)).is_some());
        assert!(Price::new(Money::from_toomans(Price::MIN - 1)).is_none());
        assert!(Price::new(Money::from_toomans(Price::MAX + 1)).is_none());
    }
}
