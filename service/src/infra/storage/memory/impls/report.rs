//! [`DailyReport`] and reporting aggregation operations.

use common::{calendar, operations::{Insert, Update}, DateTime};
use tracerr::Traced;

use crate::{
    domain::{agent, meeting, report, DailyReport},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
    read,
};

use super::{impl_allocate, impl_select};

impl_allocate!(DailyReport, report::Id, "daily_reports");

impl common::Handler<Insert<DailyReport>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(daily): Insert<DailyReport>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.daily_reports.contains_key(&daily.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "daily_reports_pkey",
                    });
                }
                // One report per agent per business day.
                if state.daily_reports.values().any(|r| {
                    r.agent_id == daily.agent_id && r.date == daily.date
                }) {
                    return Err(Error::UniqueViolation {
                        constraint: "daily_reports_agent_date_key",
                    });
                }
                let _ = state.daily_reports.insert(daily.id, daily);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<DailyReport>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(daily): Update<DailyReport>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.daily_reports.contains_key(&daily.id) {
                    return Err(Error::RowMissing {
                        table: "daily_reports",
                    });
                }
                let _ = state.daily_reports.insert(daily.id, daily);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<DailyReport>, by: report::Id, |state, id| {
    state.daily_reports.get(&id).cloned()
});

impl_select!(
    Option<DailyReport>,
    by: (agent::Id, calendar::Date),
    |state, key| {
        let (agent_id, date) = key;
        state
            .daily_reports
            .values()
            .find(|r| r.agent_id == agent_id && r.date == date)
            .cloned()
    }
);

impl_select!(
    Vec<DailyReport>,
    by: read::report::AgentMonth,
    |state, selector| {
        state
            .daily_reports
            .values()
            .filter(|r| {
                r.agent_id == selector.agent
                    && r.date.year() == selector.year
                    && r.date.month() == selector.month
            })
            .cloned()
            .collect()
    }
);

impl_select!(
    read::report::Tally,
    by: read::report::Window,
    |state, window| {
        let in_window = |at: DateTime| window.contains(at);

        let listings_created = state
            .sale_listings
            .values()
            .filter(|l| l.agent_id == window.agent)
            .filter(|l| in_window(l.created_at.coerce()))
            .count() as u64
            + state
                .rent_listings
                .values()
                .filter(|l| l.agent_id == window.agent)
                .filter(|l| in_window(l.created_at.coerce()))
                .count() as u64;

        let meetings = |class: meeting::Class| {
            state
                .meetings
                .values()
                .filter(|m| m.agent_id == window.agent && m.class == class)
                .filter(|m| in_window(m.created_at.coerce()))
                .count() as u64
        };

        let trades_closed = state
            .trades
            .values()
            .filter(|t| t.agent_id == window.agent)
            .filter(|t| in_window(t.created_at.coerce()))
            .count() as u64;

        read::report::Tally {
            listings_created,
            visits_scheduled: meetings(meeting::Class::Visit),
            sessions_scheduled: meetings(meeting::Class::Session),
            trades_closed,
        }
    }
);

impl_select!(
    read::report::InteractionStats,
    by: read::report::Window,
    |state, window| {
        let sent: Vec<_> = state
            .interactions
            .values()
            .filter(|i| i.sender == window.agent)
            .filter(|i| window.contains(i.created_at.coerce()))
            .collect();

        let viewed_or_responded = sent
            .iter()
            .filter(|i| i.viewed_at.is_some())
            .count() as u64;

        read::report::InteractionStats {
            sent: sent.len() as u64,
            viewed_or_responded,
        }
    }
);
