//! [`Command`] for registering a new [`Agent`].

use common::{
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, location, Agent},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Agent`].
///
/// Only a manager may register agents.
#[derive(Clone, Debug)]
pub struct CreateAgent {
    /// ID of the [`Agent`] performing the registration.
    pub initiator_id: agent::Id,

    /// [`Username`](agent::Username) of the new [`Agent`].
    pub username: agent::Username,

    /// [`DisplayName`](agent::DisplayName) of the new [`Agent`].
    pub display_name: agent::DisplayName,

    /// [`Role`](agent::Role) of the new [`Agent`].
    pub role: agent::Role,

    /// Home sub-district of the new [`Agent`].
    pub sub_district: location::sub_district::Id,
}

impl<Db> Command<CreateAgent> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<
                By<Option<location::SubDistrict>, location::sub_district::Id>,
            >,
            Ok = Option<location::SubDistrict>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Agent>,
            Ok = agent::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Agent>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Agent;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateAgent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAgent {
            initiator_id,
            username,
            display_name,
            role,
            sub_district,
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

        self.database()
            .execute(Select(By::<Option<location::SubDistrict>, _>::new(
                sub_district,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SubDistrictNotExists(sub_district))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let id = tx
            .execute(Allocate::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = Agent {
            id,
            username,
            display_name,
            role,
            sub_district,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };

        tx.execute(Insert(created.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(created)
    }
}

/// Error of [`CreateAgent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// Only a manager registers agents.
    #[display("`{role}` role may not register agents")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Sub-district with the provided ID does not exist.
    #[display("`SubDistrict(id: {_0})` does not exist")]
    SubDistrictNotExists(#[error(not(source))] location::sub_district::Id),
}
