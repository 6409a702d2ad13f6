//! Matchmaking suggestion [`Query`] collection.
//!
//! Feeds pair a listing with its compatible customers and a customer with
//! its compatible listings, applying the matching rules, the scoring
//! cut-off and — for non-manager callers — the territorial filter.

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        code::Code,
        matching,
        Agent, Buyer, RentListing, Renter, SaleListing,
    },
    infra::{storage, Storage},
    Service,
};

use super::Query;

/// One scored suggestion.
#[derive(Clone, Debug)]
pub struct Suggestion<T> {
    /// The suggested entity.
    pub node: T,

    /// Score of the suggestion, `40..=100`.
    pub score: matching::Score,
}

/// [`Query`] for buyers compatible with a sale listing.
#[derive(Clone, Debug)]
pub struct SuggestBuyers {
    /// ID of the querying [`Agent`].
    pub initiator_id: agent::Id,

    /// [`Code`] of the [`SaleListing`] to suggest for.
    pub listing_code: Code,
}

impl<Db> Query<SuggestBuyers> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<SaleListing>, Code>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Buyer>, ()>>,
            Ok = Vec<Buyer>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Vec<Suggestion<Buyer>>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SuggestBuyers,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SuggestBuyers {
            initiator_id,
            listing_code,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        let is_manager = initiator.role == agent::Role::Manager;

        let listing = self
            .database()
            .execute(Select(By::<Option<SaleListing>, _>::new(
                listing_code.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|l| is_manager || !l.delete_requested)
            .ok_or(E::ListingNotExists(listing_code))
            .map_err(tracerr::wrap!())?;

        let mut suggestions: Vec<_> = self
            .database()
            .execute(Select(By::<Vec<Buyer>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|buyer| matching::buyer_matches_sale(&listing, buyer))
            .map(|buyer| {
                let score = matching::score_sale(&listing, &buyer);
                Suggestion { node: buyer, score }
            })
            .filter(|s| s.score.is_suggestible())
            .collect();
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(suggestions)
    }
}

/// [`Query`] for sale listings compatible with a buyer.
#[derive(Clone, Debug)]
pub struct SuggestSaleListings {
    /// ID of the querying [`Agent`].
    pub initiator_id: agent::Id,

    /// [`Code`] of the [`Buyer`] to suggest for.
    pub buyer_code: Code,
}

impl<Db> Query<SuggestSaleListings> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Buyer>, Code>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<SaleListing>, ()>>,
            Ok = Vec<SaleListing>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Vec<Suggestion<SaleListing>>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SuggestSaleListings,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SuggestSaleListings {
            initiator_id,
            buyer_code,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        let is_manager = initiator.role == agent::Role::Manager;

        let buyer = self
            .database()
            .execute(Select(By::<Option<Buyer>, _>::new(buyer_code.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|b| is_manager || !b.delete_requested)
            .ok_or(E::CustomerNotExists(buyer_code))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let mut suggestions: Vec<_> = self
            .database()
            .execute(Select(By::<Vec<SaleListing>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|l| !is_expired(l.expires_at.map(|at| at.coerce()), now))
            .filter(|l| {
                is_manager
                    || buyer
                        .interested_sub_districts
                        .contains(&l.location.sub_district)
            })
            .filter(|l| matching::sale_matches_buyer(&buyer, l))
            .map(|l| {
                let score = matching::score_sale(&l, &buyer);
                Suggestion { node: l, score }
            })
            .filter(|s| s.score.is_suggestible())
            .collect();
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(suggestions)
    }
}

/// [`Query`] for renters compatible with a rent listing.
#[derive(Clone, Debug)]
pub struct SuggestRenters {
    /// ID of the querying [`Agent`].
    pub initiator_id: agent::Id,

    /// [`Code`] of the [`RentListing`] to suggest for.
    pub listing_code: Code,
}

impl<Db> Query<SuggestRenters> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<RentListing>, Code>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Renter>, ()>>,
            Ok = Vec<Renter>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Vec<Suggestion<Renter>>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SuggestRenters,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SuggestRenters {
            initiator_id,
            listing_code,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        let is_manager = initiator.role == agent::Role::Manager;

        let listing = self
            .database()
            .execute(Select(By::<Option<RentListing>, _>::new(
                listing_code.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|l| is_manager || !l.delete_requested)
            .ok_or(E::ListingNotExists(listing_code))
            .map_err(tracerr::wrap!())?;

        // The candidate set is the union of the convertible and
        // non-convertible branches, de-duplicated by renter.
        let mut suggestions: Vec<_> = self
            .database()
            .execute(Select(By::<Vec<Renter>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|renter| {
                is_manager
                    || renter
                        .interested_sub_districts
                        .contains(&listing.location.sub_district)
            })
            .filter(|renter| matching::renter_matches_rent(&listing, renter))
            .unique_by(|renter| renter.id)
            .map(|renter| {
                let score = matching::score_rent(&listing, &renter);
                Suggestion {
                    node: renter,
                    score,
                }
            })
            .filter(|s| s.score.is_suggestible())
            .collect();
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(suggestions)
    }
}

/// [`Query`] for rent listings compatible with a renter.
#[derive(Clone, Debug)]
pub struct SuggestRentListings {
    /// ID of the querying [`Agent`].
    pub initiator_id: agent::Id,

    /// [`Code`] of the [`Renter`] to suggest for.
    pub renter_code: Code,
}

impl<Db> Query<SuggestRentListings> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Renter>, Code>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<RentListing>, ()>>,
            Ok = Vec<RentListing>,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Vec<Suggestion<RentListing>>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SuggestRentListings,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SuggestRentListings {
            initiator_id,
            renter_code,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;
        let is_manager = initiator.role == agent::Role::Manager;

        let renter = self
            .database()
            .execute(Select(By::<Option<Renter>, _>::new(
                renter_code.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|r| is_manager || !r.delete_requested)
            .ok_or(E::CustomerNotExists(renter_code))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let mut suggestions: Vec<_> = self
            .database()
            .execute(Select(By::<Vec<RentListing>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(|l| !is_expired(l.expires_at.map(|at| at.coerce()), now))
            .filter(|l| {
                is_manager
                    || renter
                        .interested_sub_districts
                        .contains(&l.location.sub_district)
            })
            .filter(|l| matching::rent_matches_renter(&renter, l))
            .unique_by(|l| l.id)
            .map(|l| {
                let score = matching::score_rent(&l, &renter);
                Suggestion { node: l, score }
            })
            .filter(|s| s.score.is_suggestible())
            .collect();
        suggestions.sort_by(|a, b| b.score.cmp(&a.score));

        Ok(suggestions)
    }
}

/// Indicates whether an expiry stamp lies in the past.
fn is_expired(expires_at: Option<DateTime>, now: DateTime) -> bool {
    expires_at.is_some_and(|at| at < now)
}

/// Error of a suggestion [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Customer with the provided [`Code`] does not exist.
    #[display("customer `{_0}` does not exist")]
    CustomerNotExists(#[error(not(source))] Code),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// Listing with the provided [`Code`] does not exist.
    #[display("listing `{_0}` does not exist")]
    ListingNotExists(#[error(not(source))] Code),
}
