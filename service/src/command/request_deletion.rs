//! [`Command`] for flagging an entity with a delete request.

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        advertiser, agent, customer, listing,
        permission::{self, Action, EntityKind},
        Advertiser, Agent, Buyer, RentListing, Renter, SaleListing,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// Entity a delete request targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
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
}

/// [`Command`] for flagging an entity with a delete request.
///
/// Flagged entities are hidden from non-manager reads; only a manager
/// hard-deletes them (see
/// [`PurgeEntity`](crate::command::PurgeEntity)). Non-manager initiators
/// must hold territorial authority over the entity.
#[derive(Clone, Copy, Debug)]
pub struct RequestDeletion {
    /// ID of the [`Agent`] requesting the deletion.
    pub initiator_id: agent::Id,

    /// Entity being flagged.
    pub target: Target,
}

impl<Db> Command<RequestDeletion> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<SaleListing>, listing::sale::Id>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<Update<SaleListing>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<RentListing>, listing::rent::Id>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<Update<RentListing>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Buyer>, customer::buyer::Id>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Buyer>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Renter>, customer::renter::Id>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Renter>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Advertiser>, advertiser::Id>>,
            Ok = Option<Advertiser>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Advertiser>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestDeletion,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestDeletion {
            initiator_id,
            target,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        let entity_kind = match target {
            Target::SaleListing(_) => EntityKind::SaleListing,
            Target::RentListing(_) => EntityKind::RentListing,
            Target::Buyer(_) => EntityKind::Buyer,
            Target::Renter(_) => EntityKind::Renter,
            Target::Advertiser(_) => EntityKind::Advertiser,
        };
        if !permission::authorize(
            Some(initiator.role),
            entity_kind,
            Action::Delete,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let is_manager = initiator.role == agent::Role::Manager;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        match target {
            Target::SaleListing(id) => {
                let mut row = tx
                    .execute(Select(By::<Option<SaleListing>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::TargetNotExists)
                    .map_err(tracerr::wrap!())?;
                if !is_manager
                    && row.location.sub_district != initiator.sub_district
                {
                    return Err(tracerr::new!(E::Territorial));
                }
                row.delete_requested = true;
                tx.execute(Update(row))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
            Target::RentListing(id) => {
                let mut row = tx
                    .execute(Select(By::<Option<RentListing>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::TargetNotExists)
                    .map_err(tracerr::wrap!())?;
                if !is_manager
                    && row.location.sub_district != initiator.sub_district
                {
                    return Err(tracerr::new!(E::Territorial));
                }
                row.delete_requested = true;
                tx.execute(Update(row))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
            Target::Buyer(id) => {
                let mut row = tx
                    .execute(Select(By::<Option<Buyer>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::TargetNotExists)
                    .map_err(tracerr::wrap!())?;
                if !is_manager
                    && !row
                        .interested_sub_districts
                        .contains(&initiator.sub_district)
                {
                    return Err(tracerr::new!(E::Territorial));
                }
                row.delete_requested = true;
                tx.execute(Update(row))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
            Target::Renter(id) => {
                let mut row = tx
                    .execute(Select(By::<Option<Renter>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::TargetNotExists)
                    .map_err(tracerr::wrap!())?;
                if !is_manager
                    && !row
                        .interested_sub_districts
                        .contains(&initiator.sub_district)
                {
                    return Err(tracerr::new!(E::Territorial));
                }
                row.delete_requested = true;
                tx.execute(Update(row))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
            Target::Advertiser(id) => {
                let mut row = tx
                    .execute(Select(By::<Option<Advertiser>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::TargetNotExists)
                    .map_err(tracerr::wrap!())?;
                row.delete_requested = true;
                tx.execute(Update(row))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`RequestDeletion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not request deletions of this kind")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// The flagged entity does not exist.
    #[display("delete-request target does not exist")]
    TargetNotExists,

    /// The agent holds no territorial authority over the entity.
    #[display(
        "agent's sub-district holds no authority over the entity"
    )]
    Territorial,
}
