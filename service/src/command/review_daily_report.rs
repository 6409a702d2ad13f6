//! [`Command`] for annotating and closing a [`DailyReport`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, meeting::ManagerNote, report, Agent, DailyReport},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// [`Command`] for annotating and optionally closing a [`DailyReport`].
///
/// Only a manager reviews daily reports.
#[derive(Clone, Debug)]
pub struct ReviewDailyReport {
    /// ID of the reviewing [`Agent`].
    pub initiator_id: agent::Id,

    /// ID of the [`DailyReport`] being reviewed.
    pub report_id: report::Id,

    /// Note to leave on the report, if any.
    pub note: Option<ManagerNote>,

    /// Indicator whether the report is closed by this review.
    pub close: bool,
}

impl<Db> Command<ReviewDailyReport> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<DailyReport>, report::Id>>,
            Ok = Option<DailyReport>,
            Err = Traced<storage::Error>,
        > + Storage<Update<DailyReport>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = DailyReport;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ReviewDailyReport,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReviewDailyReport {
            initiator_id,
            report_id,
            note,
            close,
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

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut reviewed = tx
            .execute(Select(By::<Option<DailyReport>, _>::new(report_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReportNotExists(report_id))
            .map_err(tracerr::wrap!())?;

        if let Some(note) = note {
            reviewed.manager_note = Some(note);
        }
        if close {
            reviewed.closed = true;
        }

        tx.execute(Update(reviewed.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reviewed)
    }
}

/// Error of [`ReviewDailyReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// Only a manager reviews daily reports.
    #[display("`{role}` role may not review daily reports")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// [`DailyReport`] with the provided ID does not exist.
    #[display("`DailyReport(id: {_0})` does not exist")]
    ReportNotExists(#[error(not(source))] report::Id),
}
