//! [`Agent`] operations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::{agent, Agent},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
    read,
};

use super::{impl_allocate, impl_select};

impl_allocate!(Agent, agent::Id, "agents");

impl common::Handler<Insert<Agent>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(agent): Insert<Agent>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.agents.contains_key(&agent.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "agents_pkey",
                    });
                }
                if state.agents.values().any(|a| a.username == agent.username)
                {
                    return Err(Error::UniqueViolation {
                        constraint: "agents_username_key",
                    });
                }
                let _ = state.agents.insert(agent.id, agent);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Agent>, by: agent::Id, |state, id| {
    state.agents.get(&id).cloned()
});

impl_select!(Vec<Agent>, by: read::agent::Active, |state, _active| {
    state.agents.values().filter(|a| a.is_active()).cloned().collect()
});
