//! [`Task`] operations.

use common::operations::{Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{code::Code, task, Task},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
};

use super::{impl_allocate, impl_select};

impl_allocate!(Task, task::Id, "tasks");

impl common::Handler<Insert<Task>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(task): Insert<Task>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.tasks.contains_key(&task.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "tasks_pkey",
                    });
                }
                if state.tasks.values().any(|t| t.code == task.code) {
                    return Err(Error::UniqueViolation {
                        constraint: "tasks_code_key",
                    });
                }
                let _ = state.tasks.insert(task.id, task);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Task>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(task): Update<Task>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.tasks.contains_key(&task.id) {
                    return Err(Error::RowMissing { table: "tasks" });
                }
                let _ = state.tasks.insert(task.id, task);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Task>, by: task::Id, |state, id| {
    state.tasks.get(&id).cloned()
});

impl_select!(Option<Task>, by: Code, |state, code| {
    state.tasks.values().find(|t| t.code == code).cloned()
});
