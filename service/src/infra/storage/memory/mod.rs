//! In-memory [`Storage`] implementation.
//!
//! The store keeps relational semantics: per-kind tables, unique indexes
//! surfaced as [`Error::UniqueViolation`] insertion failures, and
//! serializable transactions. [`Transact`] takes the global lock and
//! clones the state into a working copy; [`Commit`] writes it back, and a
//! dropped transaction discards it — readers observe either all of a
//! transaction or none of it.

pub mod client;
mod impls;
mod state;

use common::operations::{Commit, Transact};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

#[cfg(doc)]
use crate::infra::Storage;
use crate::infra::storage;

pub use self::client::{NonTx, Tx};

/// In-memory [`Storage`] client.
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] storage.
    #[must_use]
    pub fn new() -> Self {
        Self(NonTx::default())
    }
}

impl Memory<NonTx> {
    /// Returns the inner [`NonTx`] client.
    fn client(&self) -> &NonTx {
        &self.0
    }
}

impl Memory<Tx> {
    /// Returns the inner [`Tx`] client.
    fn client(&self) -> &Tx {
        &self.0
    }
}

/// In-memory storage [`Error`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Unique index violation.
    #[display("unique constraint `{constraint}` violated")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: &'static str,
    },

    /// Row targeted by an update or deletion does not exist.
    #[display("row missing in `{table}` table")]
    RowMissing {
        /// Name of the table.
        table: &'static str,
    },
}

impl Error {
    /// Checks if the error is a unique violation of the specified
    /// constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation { constraint: c } => {
                constraint.map_or(true, |want| *c == want)
            }
            Self::RowMissing { .. } => false,
        }
    }
}

impl common::Handler<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<storage::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = self.0.share().lock_owned().await;
        Ok(Memory(Tx::new(guard)))
    }
}

impl common::Handler<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit();
        Ok(())
    }
}
