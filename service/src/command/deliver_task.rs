//! [`Command`] for delivering a [`Task`] result.

use common::operations::{
    Allocate, By, Commit, Insert, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, code::Code, meeting::ResultText, review, task,
        transition::StateTransitionError, Agent, ReviewTask, Task,
    },
    infra::{storage, Storage},
    Service,
};

use super::{spawn_review, Command};

/// [`Command`] for delivering a [`Task`] result, moving it from `Open` to
/// `Delivered`.
///
/// Only the assignee delivers; delivering spawns the delivery review task
/// for the manager.
#[derive(Clone, Debug)]
pub struct DeliverTask {
    /// ID of the [`Agent`] delivering the result.
    pub initiator_id: agent::Id,

    /// ID of the [`Task`] to deliver.
    pub task_id: task::Id,

    /// The recorded result.
    pub result: ResultText,
}

impl<Db> Command<DeliverTask> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<Task>, task::Id>>,
            Ok = Option<Task>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Task>, Err = Traced<storage::Error>>
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
    type Ok = Task;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeliverTask) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeliverTask {
            initiator_id,
            task_id,
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

        let mut delivered = tx
            .execute(Select(By::<Option<Task>, _>::new(task_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::TaskNotExists(task_id))
            .map_err(tracerr::wrap!())?;

        // Results are delivered by the assignee only.
        if delivered.agent_id != initiator_id {
            return Err(tracerr::new!(E::NotAssignee(task_id)));
        }

        if !delivered.status.may_become(task::Status::Delivered) {
            return Err(tracerr::new!(E::StateTransition(
                StateTransitionError::new(
                    delivered.status,
                    task::Status::Delivered,
                ),
            )));
        }

        delivered.status = task::Status::Delivered;
        delivered.result = Some(result);

        tx.execute(Update(delivered.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        spawn_review(
            &tx,
            review::Kind::TaskDelivery,
            review::Subject::Task(delivered.id),
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

        Ok(delivered)
    }
}

/// Error of [`DeliverTask`] [`Command`] execution.
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

    /// Only the assignee delivers a task.
    #[display("`Task(id: {_0})` is assigned to another agent")]
    NotAssignee(#[error(not(source))] task::Id),

    /// The task is not in a state accepting delivery.
    #[display("{_0}")]
    StateTransition(StateTransitionError),

    /// [`Task`] with the provided ID does not exist.
    #[display("`Task(id: {_0})` does not exist")]
    TaskNotExists(#[error(not(source))] task::Id),
}
