//! Per-agent performance [`Query`].

use std::time::Duration;

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::agent,
    infra::{storage, Storage},
    query::Query,
    read, Service,
};

/// [`Query`] for an agent's operational performance over a trailing
/// window of days.
#[derive(Clone, Copy, Debug)]
pub struct Performance {
    /// Agent the report is about.
    pub agent_id: agent::Id,

    /// Length of the trailing window, in days.
    pub window_days: u32,
}

/// Output of the [`Performance`] [`Query`].
#[derive(Clone, Copy, Debug)]
pub struct Output {
    /// Operational counts within the window.
    pub tally: read::report::Tally,

    /// Interaction counts within the window.
    pub interactions: read::report::InteractionStats,

    /// Response rate of the window: `viewed_or_responded / sent`.
    pub response_rate: Decimal,
}

impl<Db> Query<Performance> for Service<Db>
where
    Db: Storage<
            Select<By<read::report::Tally, read::report::Window>>,
            Ok = read::report::Tally,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<read::report::InteractionStats, read::report::Window>>,
            Ok = read::report::InteractionStats,
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Performance {
            agent_id,
            window_days,
        }: Performance,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let end = DateTime::now();
        let start =
            end - Duration::from_secs(u64::from(window_days) * 24 * 60 * 60);
        let window = read::report::Window {
            agent: agent_id,
            start,
            end,
        };

        let tally = self
            .database()
            .execute(Select(By::<read::report::Tally, _>::new(window)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let interactions = self
            .database()
            .execute(Select(By::<read::report::InteractionStats, _>::new(
                window,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            tally,
            interactions,
            response_rate: interactions.response_rate(),
        })
    }
}

/// Error of [`Performance`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),
}
