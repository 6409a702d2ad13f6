//! Month-grid activity [`Query`].

use common::{
    calendar,
    operations::{By, Select},
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{agent, DailyReport},
    infra::{storage, Storage},
    query::Query,
    read, Service,
};

/// [`Query`] for one agent's daily-report submissions over one business
/// month, as a per-day grid.
#[derive(Clone, Copy, Debug)]
pub struct MonthActivity {
    /// Agent the grid is about.
    pub agent_id: agent::Id,

    /// Business year of the grid.
    pub year: u16,

    /// Business month of the grid, `1..=12`.
    pub month: u8,
}

impl<Db> Query<MonthActivity> for Service<Db>
where
    Db: Storage<
        Select<By<Vec<DailyReport>, read::report::AgentMonth>>,
        Ok = Vec<DailyReport>,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Vec<read::report::DayCell>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        MonthActivity {
            agent_id,
            year,
            month,
        }: MonthActivity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let submitted = self
            .database()
            .execute(Select(By::<Vec<DailyReport>, _>::new(
                read::report::AgentMonth {
                    agent: agent_id,
                    year,
                    month,
                },
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(calendar::month_days(year, month)
            .into_iter()
            .map(|date| read::report::DayCell {
                date,
                submitted: submitted.iter().any(|r| r.date == date),
            })
            .collect())
    }
}

/// Error of [`MonthActivity`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),
}
