//! [`Command`] for registering a new [`Advertiser`].

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        advertiser, agent,
        code::Code,
        permission::{self, Action, EntityKind},
        phone::Phone,
        review, Advertiser, Agent, ReviewTask,
    },
    infra::{storage, Storage},
    Service,
};

use super::{spawn_review, Command};

/// [`Command`] for registering a new [`Advertiser`].
#[derive(Clone, Debug)]
pub struct CreateAdvertiser {
    /// ID of the [`Agent`] performing the registration.
    pub initiator_id: agent::Id,

    /// [`Name`](advertiser::Name) of the new [`Advertiser`].
    pub name: advertiser::Name,

    /// Unique [`Phone`] of the new [`Advertiser`].
    pub phone: Phone,

    /// [`Description`](advertiser::Description) of the new
    /// [`Advertiser`], if any.
    pub description: Option<advertiser::Description>,
}

impl<Db> Command<CreateAdvertiser> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Advertiser>, Phone>>,
            Ok = Option<Advertiser>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Advertiser>,
            Ok = advertiser::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Advertiser>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<ReviewTask>, Code>>,
            Ok = Option<ReviewTask>,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<ReviewTask>,
            Ok = review::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<ReviewTask>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Advertiser;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateAdvertiser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAdvertiser {
            initiator_id,
            name,
            phone,
            description,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        if !permission::authorize(
            Some(initiator.role),
            EntityKind::Advertiser,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let occupied = self
            .database()
            .execute(Select(By::<Option<Advertiser>, _>::new(phone.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::PhoneOccupied(phone)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = tx
            .execute(Allocate::<Advertiser>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let advertiser = Advertiser {
            id,
            name,
            phone,
            description,
            status: crate::domain::approval::Status::Pending,
            delete_requested: false,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(advertiser.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        spawn_review(
            &tx,
            review::Kind::NewAdvertiser,
            review::Subject::Advertiser(advertiser.id),
        )
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .ok_or(E::CodeSpaceExhausted)
        .map_err(tracerr::wrap!())
        .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(advertiser)
    }
}

/// Error of [`CreateAdvertiser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Probing free review codes exhausted the 6-digit space.
    #[display("no free 6-digit code found")]
    CodeSpaceExhausted,

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not create advertisers")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// [`Phone`] is already registered to another [`Advertiser`].
    #[display("`{_0}` phone is occupied")]
    PhoneOccupied(#[error(not(source))] Phone),
}
