//! [`Command`] for viewing an [`Interaction`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, notification, Agent, Interaction},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] recording that the receiver viewed an [`Interaction`].
///
/// Viewing drops the receiver's cached unread counter.
#[derive(Clone, Copy, Debug)]
pub struct ViewInteraction {
    /// ID of the viewing [`Agent`].
    pub initiator_id: agent::Id,

    /// ID of the viewed [`Interaction`].
    pub interaction_id: notification::InteractionId,
}

impl<Db> Command<ViewInteraction> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Interaction>, notification::InteractionId>>,
            Ok = Option<Interaction>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Interaction>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Interaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ViewInteraction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ViewInteraction {
            initiator_id,
            interaction_id,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut viewed = tx
            .execute(Select(By::<Option<Interaction>, _>::new(
                interaction_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InteractionNotExists(interaction_id))
            .map_err(tracerr::wrap!())?;

        if viewed.receiver != initiator_id {
            return Err(tracerr::new!(E::NotReceiver(interaction_id)));
        }

        if viewed.viewed_at.is_none() {
            viewed.viewed_at = Some(DateTime::now().coerce());

            tx.execute(Update(viewed.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            self.unread().invalidate(initiator_id).await;
        }

        Ok(viewed)
    }
}

/// Error of [`ViewInteraction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// [`Interaction`] with the provided ID does not exist.
    #[display("`Interaction(id: {_0})` does not exist")]
    InteractionNotExists(
        #[error(not(source))] notification::InteractionId,
    ),

    /// Only the receiver views an interaction.
    #[display("`Interaction(id: {_0})` is addressed to another agent")]
    NotReceiver(#[error(not(source))] notification::InteractionId),
}
