//! [`Command`] for sending an [`Interaction`].

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, notification, Agent, Buyer, Interaction, Notification,
        RentListing, Renter, SaleListing,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for sending a suggestion [`Interaction`] from one agent to
/// another.
///
/// Each suggested entity is snapshotted with its current price and area
/// figures; the receiver's cached unread counter is dropped after the
/// send commits.
#[derive(Clone, Debug)]
pub struct SendInteraction {
    /// ID of the sending [`Agent`].
    pub initiator_id: agent::Id,

    /// ID of the receiving [`Agent`].
    pub receiver_id: agent::Id,

    /// Parent [`Notification`] being replied to, if any.
    pub notification_id: Option<notification::Id>,

    /// Entities to suggest.
    pub targets: Vec<notification::Target>,
}

impl<Db> Command<SendInteraction> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Notification>, notification::Id>>,
            Ok = Option<Notification>,
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
            Allocate<Interaction>,
            Ok = notification::InteractionId,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Interaction>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Interaction;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SendInteraction,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendInteraction {
            initiator_id,
            receiver_id,
            notification_id,
            targets,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;
        self.database()
            .execute(Select(By::<Option<Agent>, _>::new(receiver_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(receiver_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        if let Some(notification_id) = notification_id {
            self.database()
                .execute(Select(By::<Option<Notification>, _>::new(
                    notification_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::NotificationNotExists(notification_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        // Snapshot price and area of each suggested entity at send time.
        let mut items = Vec::with_capacity(targets.len());
        for target in targets {
            let item = match target {
                notification::Target::SaleListing(id) => self
                    .database()
                    .execute(Select(By::<Option<SaleListing>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .map(|l| notification::Item {
                        target,
                        price: l.announced_price.get(),
                        area: l.area,
                    }),
                notification::Target::RentListing(id) => self
                    .database()
                    .execute(Select(By::<Option<RentListing>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .map(|l| notification::Item {
                        target,
                        price: l.announced_deposit.get(),
                        area: l.area,
                    }),
                notification::Target::Buyer(id) => self
                    .database()
                    .execute(Select(By::<Option<Buyer>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .map(|b| notification::Item {
                        target,
                        price: b.announced_budget.get(),
                        area: b.max_area,
                    }),
                notification::Target::Renter(id) => self
                    .database()
                    .execute(Select(By::<Option<Renter>, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .map(|r| notification::Item {
                        target,
                        price: r.announced_deposit.get(),
                        area: r.max_area,
                    }),
            };
            items.push(item.ok_or(E::TargetNotExists).map_err(
                tracerr::wrap!(),
            )?);
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

        let sent = Interaction {
            id,
            sender: initiator_id,
            receiver: receiver_id,
            notification_id,
            items,
            viewed_at: None,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(sent.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.unread().invalidate(receiver_id).await;

        Ok(sent)
    }
}

/// Error of [`SendInteraction`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// Parent [`Notification`] does not exist.
    #[display("`Notification(id: {_0})` does not exist")]
    NotificationNotExists(#[error(not(source))] notification::Id),

    /// A suggested entity does not exist.
    #[display("suggested entity does not exist")]
    TargetNotExists,
}
