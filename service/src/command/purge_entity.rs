//! [`Command`] for hard-deleting an entity.

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, Agent},
    infra::{storage, Storage},
    Service,
};

use super::{request_deletion::Target, Command};

/// [`Command`] for hard-deleting an entity.
///
/// Only a manager hard-deletes; the storage cascades over bookmarks,
/// review tasks and notifications referencing the entity.
#[derive(Clone, Copy, Debug)]
pub struct PurgeEntity {
    /// ID of the [`Agent`] performing the purge.
    pub initiator_id: agent::Id,

    /// Entity being purged.
    pub target: Target,
}

impl<Db> Command<PurgeEntity> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Delete<crate::domain::listing::sale::Id>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<crate::domain::listing::rent::Id>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<crate::domain::customer::buyer::Id>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<crate::domain::customer::renter::Id>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<crate::domain::advertiser::Id>,
            Err = Traced<storage::Error>,
        > + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: PurgeEntity) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PurgeEntity {
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

        if initiator.role != agent::Role::Manager {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        match target {
            Target::SaleListing(id) => tx
                .execute(Delete(id))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
            Target::RentListing(id) => tx
                .execute(Delete(id))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
            Target::Buyer(id) => tx
                .execute(Delete(id))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
            Target::Renter(id) => tx
                .execute(Delete(id))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
            Target::Advertiser(id) => tx
                .execute(Delete(id))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?,
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`PurgeEntity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// Only a manager hard-deletes.
    #[display("`{role}` role may not hard-delete entities")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },
}
