//! [`Command`] for toggling a [`Bookmark`].

use common::{
    operations::{Allocate, By, Commit, Select, Toggle, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, bookmark, Agent, Bookmark, Buyer, RentListing, Renter,
        SaleListing,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for toggling a [`Bookmark`]: marks the target if no
/// bookmark exists for the `(agent, target)` pair, unmarks it otherwise.
#[derive(Clone, Copy, Debug)]
pub struct ToggleBookmark {
    /// ID of the [`Agent`] toggling the bookmark.
    pub initiator_id: agent::Id,

    /// [`bookmark::Target`] being toggled.
    pub target: bookmark::Target,
}

impl<Db> Command<ToggleBookmark> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<SaleListing>, crate::domain::listing::sale::Id>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<RentListing>, crate::domain::listing::rent::Id>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Buyer>, crate::domain::customer::buyer::Id>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Renter>, crate::domain::customer::renter::Id>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Bookmark>,
            Ok = bookmark::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Toggle<Bookmark>,
            Ok = bookmark::Outcome,
            Err = Traced<storage::Error>,
        > + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = bookmark::Outcome;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ToggleBookmark,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ToggleBookmark {
            initiator_id,
            target,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let target_exists = match target {
            bookmark::Target::SaleListing(id) => self
                .database()
                .execute(Select(By::<Option<SaleListing>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some(),
            bookmark::Target::RentListing(id) => self
                .database()
                .execute(Select(By::<Option<RentListing>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some(),
            bookmark::Target::Buyer(id) => self
                .database()
                .execute(Select(By::<Option<Buyer>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some(),
            bookmark::Target::Renter(id) => self
                .database()
                .execute(Select(By::<Option<Renter>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some(),
        };
        if !target_exists {
            return Err(tracerr::new!(E::TargetNotExists));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = tx
            .execute(Allocate::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let outcome = tx
            .execute(Toggle(Bookmark {
                id,
                agent_id: initiator_id,
                target,
                created_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(outcome)
    }
}

/// Error of [`ToggleBookmark`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The bookmarked entity does not exist.
    #[display("bookmark target does not exist")]
    TargetNotExists,
}
