//! [`Command`] for capturing a [`Trade`]'s registry follow-up code.

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        permission::{self, Action, EntityKind},
        trade, transition::StateTransitionError,
        Agent, Trade,
    },
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for capturing a [`Trade`]'s registry follow-up code,
/// moving it from `Created` to `FollowupCaptured`.
#[derive(Clone, Debug)]
pub struct CaptureFollowup {
    /// ID of the [`Agent`] capturing the code.
    pub initiator_id: agent::Id,

    /// ID of the [`Trade`] to capture for.
    pub trade_id: trade::Id,

    /// The registry follow-up code.
    pub followup: trade::FollowupCode,
}

impl<Db> Command<CaptureFollowup> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Trade>, trade::Id>>,
            Ok = Option<Trade>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Trade>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Trade;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CaptureFollowup,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CaptureFollowup {
            initiator_id,
            trade_id,
            followup,
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
            EntityKind::Trade,
            Action::Update,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut captured = tx
            .execute(Select(By::<Option<Trade>, _>::new(trade_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TradeNotExists(trade_id))
            .map_err(tracerr::wrap!())?;

        if captured.followup_captured {
            return Err(tracerr::new!(E::StateTransition(
                StateTransitionError::new(
                    trade::Status::FollowupCaptured,
                    trade::Status::FollowupCaptured,
                ),
            )));
        }

        captured.followup = Some(followup);
        captured.followup_captured = true;

        tx.execute(Update(captured.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(captured)
    }
}

/// Error of [`CaptureFollowup`] [`Command`] execution.
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
    #[display("`{role}` role may not update trades")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// The follow-up code was already captured.
    #[display("{_0}")]
    StateTransition(StateTransitionError),

    /// [`Trade`] with the provided ID does not exist.
    #[display("`Trade(id: {_0})` does not exist")]
    TradeNotExists(#[error(not(source))] trade::Id),
}
