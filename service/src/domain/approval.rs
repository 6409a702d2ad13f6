//! Approval lifecycle shared by listings, customers and advertisers.

use common::define_kind;

define_kind! {
    #[doc = "Approval status of an entity awaiting a manager verdict."]
    enum Status {
        #[doc = "The entity awaits a manager verdict."]
        Pending = 1,

        #[doc = "The entity was accepted by the manager."]
        Accepted = 2,

        #[doc = "The entity was canceled by the manager."]
        Canceled = 3,
    }
}

impl Status {
    /// Indicates whether this [`Status`] may legally become the provided
    /// one.
    #[must_use]
    pub fn may_become(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Accepted) | (Self::Pending, Self::Canceled),
        )
    }

    /// Indicates whether this [`Status`] is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled)
    }
}

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn transitions() {
        use Status::{Accepted, Canceled, Pending};

        assert!(Pending.may_become(Accepted));
        assert!(Pending.may_become(Canceled));

        assert!(!Accepted.may_become(Pending));
        assert!(!Accepted.may_become(Canceled));
        assert!(!Canceled.may_become(Pending));
        assert!(!Canceled.may_become(Accepted));
        assert!(!Pending.may_become(Pending));
    }
}
