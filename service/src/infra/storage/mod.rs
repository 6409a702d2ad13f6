//! [`Storage`]-related implementations.

pub mod memory;

use derive_more::{Display, Error as StdError, From};

pub use self::memory::Memory;

/// Storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Clone, Copy, Debug, Display, From, StdError)]
pub enum Error {
    /// [`Memory`] storage error.
    Memory(memory::Error),
}

impl Error {
    /// Checks if the error is a unique violation of the specified
    /// constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::Memory(e) => e.is_unique_violation(constraint),
        }
    }
}
