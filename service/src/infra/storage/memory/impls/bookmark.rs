//! [`Bookmark`] operations.

use common::operations::Toggle;
use tracerr::Traced;

use crate::{
    domain::{agent, bookmark, Bookmark},
    infra::storage::{
        self,
        memory::{Memory, Tx},
    },
};

use super::{impl_allocate, impl_select};

impl_allocate!(Bookmark, bookmark::Id, "bookmarks");

impl common::Handler<Toggle<Bookmark>> for Memory<Tx> {
    type Ok = bookmark::Outcome;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Toggle(bookmark): Toggle<Bookmark>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.client().mutate(|state| {
            let existing = state
                .bookmarks
                .iter()
                .find(|(_, b)| {
                    b.agent_id == bookmark.agent_id
                        && b.target == bookmark.target
                })
                .map(|(id, _)| *id);

            if let Some(id) = existing {
                let _ = state.bookmarks.remove(&id);
                bookmark::Outcome::Unmarked
            } else {
                let _ = state.bookmarks.insert(bookmark.id, bookmark);
                bookmark::Outcome::Marked
            }
        }))
    }
}

impl_select!(
    Option<Bookmark>,
    by: (agent::Id, bookmark::Target),
    |state, key| {
        let (agent_id, target) = key;
        state
            .bookmarks
            .values()
            .find(|b| b.agent_id == agent_id && b.target == target)
            .cloned()
    }
);

impl_select!(Vec<Bookmark>, by: agent::Id, |state, agent_id| {
    state
        .bookmarks
        .values()
        .filter(|b| b.agent_id == agent_id)
        .cloned()
        .collect()
});
