//! [`Notification`] and [`Interaction`] operations.

use common::operations::{Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{agent, notification, Interaction, Notification},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
    read,
};

use super::{impl_allocate, impl_select};

impl_allocate!(Notification, notification::Id, "notifications");
impl_allocate!(Interaction, notification::InteractionId, "interactions");

impl common::Handler<Insert<Notification>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.notifications.contains_key(&notification.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "notifications_pkey",
                    });
                }
                let _ = state
                    .notifications
                    .insert(notification.id, notification);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Notification>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(notification): Update<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.notifications.contains_key(&notification.id) {
                    return Err(Error::RowMissing {
                        table: "notifications",
                    });
                }
                let _ = state
                    .notifications
                    .insert(notification.id, notification);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Insert<Interaction>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(interaction): Insert<Interaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.interactions.contains_key(&interaction.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "interactions_pkey",
                    });
                }
                let _ =
                    state.interactions.insert(interaction.id, interaction);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Interaction>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(interaction): Update<Interaction>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.interactions.contains_key(&interaction.id) {
                    return Err(Error::RowMissing {
                        table: "interactions",
                    });
                }
                let _ =
                    state.interactions.insert(interaction.id, interaction);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Notification>, by: notification::Id, |state, id| {
    state.notifications.get(&id).cloned()
});

impl_select!(
    Option<Interaction>,
    by: notification::InteractionId,
    |state, id| { state.interactions.get(&id).cloned() }
);

impl_select!(
    read::notification::UnreadCount,
    by: agent::Id,
    |state, agent_id| {
        let notifications = state
            .notifications
            .values()
            .filter(|n| n.is_unread_by(agent_id))
            .count() as u64;
        let interactions = state
            .interactions
            .values()
            .filter(|i| i.is_unread_by(agent_id))
            .count() as u64;
        read::notification::UnreadCount::from(notifications + interactions)
    }
);
