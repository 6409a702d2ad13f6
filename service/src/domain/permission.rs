//! Role-based permission matrix.
//!
//! Policy, not mechanism: the matrix is static configuration consulted
//! before every state-modifying operation. The [`Role::Dual`] grants are
//! computed as the union of the file-side and customer-side grants rather
//! than stored.

use common::define_kind;

use crate::domain::agent::Role;

define_kind! {
    #[doc = "Entity kind a permission decision is about."]
    enum EntityKind {
        #[doc = "Any level of the location hierarchy."]
        Location = 1,

        #[doc = "A sale listing."]
        SaleListing = 2,

        #[doc = "A rent listing."]
        RentListing = 3,

        #[doc = "An advertiser."]
        Advertiser = 4,

        #[doc = "A buyer."]
        Buyer = 5,

        #[doc = "A renter."]
        Renter = 6,

        #[doc = "A visit."]
        Visit = 7,

        #[doc = "A session."]
        Session = 8,

        #[doc = "A trade."]
        Trade = 9,

        #[doc = "A task."]
        Task = 10,

        #[doc = "A review task."]
        ReviewTask = 11,
    }
}

define_kind! {
    #[doc = "Action a permission decision is about."]
    enum Action {
        #[doc = "Creating an entity."]
        Create = 1,

        #[doc = "Reading an entity."]
        Read = 2,

        #[doc = "Updating an entity."]
        Update = 3,

        #[doc = "Deleting an entity."]
        Delete = 4,
    }
}

/// Decides whether the provided role may perform `action` upon entities of
/// the provided `kind`.
///
/// Role-less callers always deny.
#[must_use]
pub fn authorize(role: Option<Role>, kind: EntityKind, action: Action) -> bool {
    let Some(role) = role else {
        return false;
    };
    match role {
        Role::Manager => true,
        Role::Dual => {
            grants(Role::FilePerson, kind, action)
                || grants(Role::CustomerPerson, kind, action)
        }
        Role::FilePerson | Role::CustomerPerson | Role::Coordinator => {
            grants(role, kind, action)
        }
    }
}

/// Static grants of a single stored role.
fn grants(role: Role, kind: EntityKind, action: Action) -> bool {
    use Action::{Read, Update};
    use EntityKind as K;

    match role {
        Role::FilePerson => match kind {
            K::Location => matches!(action, Read),
            K::SaleListing
            | K::RentListing
            | K::Advertiser
            | K::Visit
            | K::Session
            | K::Trade => true,
            K::Buyer | K::Renter => matches!(action, Read),
            K::Task => matches!(action, Read | Update),
            K::ReviewTask => false,
        },
        Role::CustomerPerson => match kind {
            K::Location => matches!(action, Read),
            K::SaleListing | K::RentListing | K::Advertiser => {
                matches!(action, Read)
            }
            K::Buyer | K::Renter | K::Visit | K::Session | K::Trade => true,
            K::Task => matches!(action, Read | Update),
            K::ReviewTask => false,
        },
        Role::Coordinator => match kind {
            K::Location
            | K::SaleListing
            | K::RentListing
            | K::Advertiser
            | K::Buyer
            | K::Renter
            | K::Trade => matches!(action, Read),
            K::Visit | K::Session | K::Task => {
                matches!(action, Read | Update)
            }
            K::ReviewTask => false,
        },
        // Unconditional and computed roles are resolved in `authorize()`
        // and never reach the stored-role table.
        Role::Manager | Role::Dual => false,
    }
}

#[cfg(test)]
mod spec {
    use super::{authorize, Action, EntityKind};
    use crate::domain::agent::Role;

    const KINDS: [EntityKind; 11] = [
        EntityKind::Location,
        EntityKind::SaleListing,
        EntityKind::RentListing,
        EntityKind::Advertiser,
        EntityKind::Buyer,
        EntityKind::Renter,
        EntityKind::Visit,
        EntityKind::Session,
        EntityKind::Trade,
        EntityKind::Task,
        EntityKind::ReviewTask,
    ];

    const ACTIONS: [Action; 4] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
    ];

    #[test]
    fn manager_is_unconditional() {
        for kind in KINDS {
            for action in ACTIONS {
                assert!(authorize(Some(Role::Manager), kind, action));
            }
        }
    }

    #[test]
    fn role_less_callers_deny() {
        for kind in KINDS {
            for action in ACTIONS {
                assert!(!authorize(None, kind, action));
            }
        }
    }

    #[test]
    fn dual_is_the_union_of_both_sides() {
        for kind in KINDS {
            for action in ACTIONS {
                let file = authorize(Some(Role::FilePerson), kind, action);
                let customer =
                    authorize(Some(Role::CustomerPerson), kind, action);
                assert_eq!(
                    authorize(Some(Role::Dual), kind, action),
                    file || customer,
                    "union mismatch on {kind}/{action}",
                );
            }
        }
    }

    #[test]
    fn file_person_row() {
        let auth =
            |k, a| authorize(Some(Role::FilePerson), k, a);

        assert!(auth(EntityKind::Location, Action::Read));
        assert!(!auth(EntityKind::Location, Action::Create));
        assert!(auth(EntityKind::SaleListing, Action::Create));
        assert!(auth(EntityKind::SaleListing, Action::Delete));
        assert!(auth(EntityKind::Buyer, Action::Read));
        assert!(!auth(EntityKind::Buyer, Action::Create));
        assert!(auth(EntityKind::Task, Action::Update));
        assert!(!auth(EntityKind::Task, Action::Create));
        assert!(!auth(EntityKind::ReviewTask, Action::Read));
    }

    #[test]
    fn customer_person_row() {
        let auth =
            |k, a| authorize(Some(Role::CustomerPerson), k, a);

        assert!(auth(EntityKind::Renter, Action::Create));
        assert!(!auth(EntityKind::SaleListing, Action::Update));
        assert!(auth(EntityKind::SaleListing, Action::Read));
        assert!(auth(EntityKind::Session, Action::Create));
        assert!(!auth(EntityKind::ReviewTask, Action::Update));
    }

    #[test]
    fn coordinator_schedules_but_does_not_file() {
        let auth =
            |k, a| authorize(Some(Role::Coordinator), k, a);

        assert!(auth(EntityKind::Visit, Action::Update));
        assert!(auth(EntityKind::Session, Action::Update));
        assert!(!auth(EntityKind::Visit, Action::Create));
        assert!(!auth(EntityKind::SaleListing, Action::Create));
        assert!(auth(EntityKind::SaleListing, Action::Read));
        assert!(!auth(EntityKind::ReviewTask, Action::Read));
    }
}
