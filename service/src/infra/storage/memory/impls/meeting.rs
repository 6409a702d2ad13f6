//! [`Meeting`] operations.

use common::operations::{Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{code::Code, meeting, Meeting},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
    read,
};

use super::{impl_allocate, impl_select, paginate};

impl_allocate!(Meeting, meeting::Id, "meetings");

impl common::Handler<Insert<Meeting>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(meeting): Insert<Meeting>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.meetings.contains_key(&meeting.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "meetings_pkey",
                    });
                }
                // Visits and sessions each own a 6-digit code space.
                if state.meetings.values().any(|m| {
                    m.class == meeting.class && m.code == meeting.code
                }) {
                    return Err(Error::UniqueViolation {
                        constraint: "meetings_class_code_key",
                    });
                }
                let _ = state.meetings.insert(meeting.id, meeting);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Meeting>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(meeting): Update<Meeting>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.meetings.contains_key(&meeting.id) {
                    return Err(Error::RowMissing { table: "meetings" });
                }
                let _ = state.meetings.insert(meeting.id, meeting);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Meeting>, by: meeting::Id, |state, id| {
    state.meetings.get(&id).cloned()
});

impl_select!(Option<Meeting>, by: (meeting::Class, Code), |state, key| {
    let (class, code) = key;
    state
        .meetings
        .values()
        .find(|m| m.class == class && m.code == code)
        .cloned()
});

impl_select!(
    read::meeting::list::Page,
    by: read::meeting::list::Selector,
    |state, selector| {
        let filter = selector.filter;
        let ids: Vec<_> = state
            .meetings
            .values()
            .filter(|m| filter.agent.map_or(true, |a| m.agent_id == a))
            .filter(|m| filter.class.map_or(true, |c| m.class == c))
            .filter(|m| filter.status.map_or(true, |s| m.status == s))
            .map(|m| m.id)
            .collect();
        paginate(ids, &selector.arguments)
    }
);
