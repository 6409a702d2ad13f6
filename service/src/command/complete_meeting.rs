//! [`Command`] for recording a [`Meeting`] result.

use common::operations::{
    Allocate, By, Commit, Insert, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, code::Code, meeting, review, transition::StateTransitionError,
        Agent, Meeting, ReviewTask,
    },
    infra::{storage, Storage},
    Service,
};

use super::{spawn_review, Command};

/// [`Command`] for recording a [`Meeting`] result, moving it from
/// `Accepted` to `Done`.
///
/// Only the owning agent records results; doing so spawns the result-phase
/// review task for the manager.
#[derive(Clone, Debug)]
pub struct CompleteMeeting {
    /// ID of the [`Agent`] recording the result.
    pub initiator_id: agent::Id,

    /// ID of the [`Meeting`] to complete.
    pub meeting_id: meeting::Id,

    /// The recorded result.
    pub result: meeting::ResultText,
}

impl<Db> Command<CompleteMeeting> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Meeting>, meeting::Id>>,
            Ok = Option<Meeting>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Meeting>, Err = Traced<storage::Error>>
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
    type Ok = Meeting;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteMeeting,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteMeeting {
            initiator_id,
            meeting_id,
            result,
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

        let mut meeting = tx
            .execute(Select(By::<Option<Meeting>, _>::new(meeting_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MeetingNotExists(meeting_id))
            .map_err(tracerr::wrap!())?;

        // Results are recorded by the owning agent only.
        if meeting.agent_id != initiator_id {
            return Err(tracerr::new!(E::NotOwner(meeting_id)));
        }

        if !meeting.status.may_become(meeting::Status::Done) {
            return Err(tracerr::new!(E::StateTransition(
                StateTransitionError::new(
                    meeting.status,
                    meeting::Status::Done,
                ),
            )));
        }

        meeting.status = meeting::Status::Done;
        meeting.result = Some(result);

        tx.execute(Update(meeting.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let review_kind = match meeting.class {
            meeting::Class::Visit => review::Kind::VisitResult,
            meeting::Class::Session => review::Kind::SessionResult,
        };
        spawn_review(&tx, review_kind, review::Subject::Meeting(meeting.id))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(meeting)
    }
}

/// Error of [`CompleteMeeting`] [`Command`] execution.
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

    /// [`Meeting`] with the provided ID does not exist.
    #[display("`Meeting(id: {_0})` does not exist")]
    MeetingNotExists(#[error(not(source))] meeting::Id),

    /// Only the owning agent records a result.
    #[display("`Meeting(id: {_0})` is owned by another agent")]
    NotOwner(#[error(not(source))] meeting::Id),

    /// The meeting is not in a state accepting results.
    #[display("{_0}")]
    StateTransition(StateTransitionError),
}
