//! Cached unread counter [`Query`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::agent,
    infra::{storage, Storage},
    read, Service,
};

use super::Query;

/// [`Query`] for the number of unread notifications and interactions of
/// an agent.
///
/// The cached counter is a hint: a fresh cache entry is served directly,
/// a miss falls back to counting from storage and refills the cache.
#[derive(Clone, Copy, Debug)]
pub struct UnreadCount {
    /// Agent the counter belongs to.
    pub agent_id: agent::Id,
}

impl<Db> Query<UnreadCount> for Service<Db>
where
    Db: Storage<
        Select<By<read::notification::UnreadCount, agent::Id>>,
        Ok = read::notification::UnreadCount,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = read::notification::UnreadCount;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        UnreadCount { agent_id }: UnreadCount,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if let Some(cached) = self.unread().get(agent_id).await {
            return Ok(read::notification::UnreadCount::from(cached));
        }

        let counted = self
            .database()
            .execute(Select(By::<read::notification::UnreadCount, _>::new(
                agent_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.unread().put(agent_id, counted.get()).await;

        Ok(counted)
    }
}

/// Error of [`UnreadCount`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),
}
