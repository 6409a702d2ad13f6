//! [`Command`] for viewing a [`Notification`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, notification, Agent, Notification},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] recording that an agent viewed a [`Notification`].
///
/// Viewing drops the viewer's cached unread counter.
#[derive(Clone, Copy, Debug)]
pub struct ViewNotification {
    /// ID of the viewing [`Agent`].
    pub initiator_id: agent::Id,

    /// ID of the viewed [`Notification`].
    pub notification_id: notification::Id,
}

impl<Db> Command<ViewNotification> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Notification>, notification::Id>>,
            Ok = Option<Notification>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Notification>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Notification;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ViewNotification,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ViewNotification {
            initiator_id,
            notification_id,
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
            .execute(Select(By::<Option<Notification>, _>::new(
                notification_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotificationNotExists(notification_id))
            .map_err(tracerr::wrap!())?;

        if !viewed.recipients.contains(&initiator_id) {
            return Err(tracerr::new!(E::NotRecipient(notification_id)));
        }

        let _ = viewed.viewed_by.insert(initiator_id);

        tx.execute(Update(viewed.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.unread().invalidate(initiator_id).await;

        Ok(viewed)
    }
}

/// Error of [`ViewNotification`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// [`Notification`] with the provided ID does not exist.
    #[display("`Notification(id: {_0})` does not exist")]
    NotificationNotExists(#[error(not(source))] notification::Id),

    /// The agent is not among the notification's recipients.
    #[display("`Notification(id: {_0})` is not addressed to the agent")]
    NotRecipient(#[error(not(source))] notification::Id),
}
