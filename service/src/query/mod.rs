//! [`Query`] definition.

pub mod customers;
pub mod listings;
pub mod meetings;
pub mod report;
pub mod suggestions;
pub mod unread;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{storage, Storage},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

pub use self::unread::UnreadCount;

/// [`Query`] [`Select`]ing a `T`ype from the storage.
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided
    /// `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Storage<Select<By<W, B>>, Ok = W, Err = Traced<storage::Error>>,
{
    type Ok = W;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
