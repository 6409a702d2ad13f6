//! Notification-related read definitions.

use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::{Interaction, Notification};

/// Number of unread [`Notification`]s and [`Interaction`]s of an agent.
#[derive(
    Clone, Copy, Debug, Default, Eq, From, Hash, Into, Ord, PartialEq,
    PartialOrd,
)]
pub struct UnreadCount(u64);

impl UnreadCount {
    /// Returns the raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}
