//! [`Command`] for submitting a [`DailyReport`].

use common::{
    calendar,
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, report, Agent, DailyReport},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for submitting a [`DailyReport`].
///
/// One report per agent per business day.
#[derive(Clone, Debug)]
pub struct SubmitDailyReport {
    /// ID of the submitting [`Agent`].
    pub initiator_id: agent::Id,

    /// Business-calendar day the report covers.
    pub date: calendar::Date,

    /// Content of the report.
    pub content: report::Content,
}

impl<Db> Command<SubmitDailyReport> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<DailyReport>, (agent::Id, calendar::Date)>>,
            Ok = Option<DailyReport>,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<DailyReport>,
            Ok = report::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<DailyReport>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = DailyReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitDailyReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitDailyReport {
            initiator_id,
            date,
            content,
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

        let submitted = tx
            .execute(Select(By::<Option<DailyReport>, _>::new((
                initiator_id,
                date,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if submitted.is_some() {
            return Err(tracerr::new!(E::AlreadySubmitted(date)));
        }

        let id = tx
            .execute(Allocate::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = DailyReport {
            id,
            agent_id: initiator_id,
            date,
            content,
            manager_note: None,
            closed: false,
            created_at: DateTime::now().coerce(),
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

/// Error of [`SubmitDailyReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// A report for the provided day was already submitted.
    #[display("report for `{_0}` was already submitted")]
    AlreadySubmitted(#[error(not(source))] calendar::Date),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),
}
