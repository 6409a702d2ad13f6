//! [`Command`] for assigning a new [`Task`].

use common::{
    calendar,
    operations::{Allocate, By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent,
        code::Code,
        permission::{self, Action, EntityKind},
        task,
        validation::{Invalid, Invalids},
        Agent, Buyer, RentListing, Renter, SaleListing, Task,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_code, Command};

/// [`Command`] for assigning a new [`Task`] to an agent.
///
/// Only a manager creates tasks; the assignee's role must cover the
/// task's side.
#[derive(Clone, Debug)]
pub struct CreateTask {
    /// ID of the [`Agent`] creating the task.
    pub initiator_id: agent::Id,

    /// Title of the new [`Task`].
    pub title: task::Title,

    /// [`task::Kind`] of the new [`Task`].
    pub kind: task::Kind,

    /// ID of the [`Agent`] the task is assigned to.
    pub assignee_id: agent::Id,

    /// Business-calendar day the task is due on.
    pub deadline: calendar::Date,

    /// Listing the task refers to, if any.
    pub listing: Option<task::ListingRef>,

    /// Customer the task refers to, if any.
    pub customer: Option<task::CustomerRef>,

    /// Free-form description, if any.
    pub description: Option<crate::domain::meeting::ResultText>,
}

impl<Db> Command<CreateTask> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<SaleListing>, Code>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<RentListing>, Code>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Buyer>, Code>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Renter>, Code>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Task>,
            Ok = task::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Task>, Code>>,
            Ok = Option<Task>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Task>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Task;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateTask) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateTask {
            initiator_id,
            title,
            kind,
            assignee_id,
            deadline,
            listing,
            customer,
            description,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        if !permission::authorize(
            Some(initiator.role),
            EntityKind::Task,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let mut invalids = Invalids::new();

        let assignee = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(assignee_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        match assignee {
            None => invalids
                .push(Invalid::new("assignee", "assignee does not exist")),
            Some(assignee) => {
                if !role_covers(assignee.role, kind) {
                    invalids.push(Invalid::new(
                        "assignee",
                        "assignee's role does not cover the task's side",
                    ));
                }
            }
        }

        if deadline < calendar::Date::today() {
            invalids
                .push(Invalid::new("deadline", "deadline lies in the past"));
        }

        match &listing {
            None => {}
            Some(task::ListingRef::Sale(code)) => {
                let row = self
                    .database()
                    .execute(Select(By::<Option<SaleListing>, _>::new(
                        code.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if row.is_none() {
                    invalids.push(Invalid::new(
                        "listing",
                        "sale listing does not exist",
                    ));
                }
            }
            Some(task::ListingRef::Rent(code)) => {
                let row = self
                    .database()
                    .execute(Select(By::<Option<RentListing>, _>::new(
                        code.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if row.is_none() {
                    invalids.push(Invalid::new(
                        "listing",
                        "rent listing does not exist",
                    ));
                }
            }
        }

        match &customer {
            None => {}
            Some(task::CustomerRef::Buyer(code)) => {
                let row = self
                    .database()
                    .execute(Select(By::<Option<Buyer>, _>::new(
                        code.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if row.is_none() {
                    invalids
                        .push(Invalid::new("customer", "buyer does not exist"));
                }
            }
            Some(task::CustomerRef::Renter(code)) => {
                let row = self
                    .database()
                    .execute(Select(By::<Option<Renter>, _>::new(
                        code.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if row.is_none() {
                    invalids.push(Invalid::new(
                        "customer",
                        "renter does not exist",
                    ));
                }
            }
        }

        invalids
            .into_result()
            .map_err(E::Validation)
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let code = mint_free_code::<Task, _>(&tx)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = Task {
            id,
            code,
            title,
            kind,
            agent_id: assignee_id,
            deadline,
            listing,
            customer,
            description,
            result: None,
            status: task::Status::Open,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(created.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(created)
    }
}

/// Indicates whether the provided role may work tasks of the provided
/// kind.
fn role_covers(role: agent::Role, kind: task::Kind) -> bool {
    use agent::Role as R;

    match kind {
        task::Kind::FileSide => {
            matches!(role, R::FilePerson | R::Dual | R::Manager)
        }
        task::Kind::CustomerSide => {
            matches!(role, R::CustomerPerson | R::Dual | R::Manager)
        }
        task::Kind::Dual => matches!(role, R::Dual | R::Manager),
    }
}

/// Error of [`CreateTask`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Probing free codes exhausted the 6-digit space.
    #[display("no free 6-digit code found")]
    CodeSpaceExhausted,

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not create tasks")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}

#[cfg(test)]
mod spec {
    use super::role_covers;
    use crate::domain::{agent::Role, task};

    #[test]
    fn sides_map_to_roles() {
        assert!(role_covers(Role::FilePerson, task::Kind::FileSide));
        assert!(!role_covers(Role::FilePerson, task::Kind::CustomerSide));
        assert!(role_covers(Role::CustomerPerson, task::Kind::CustomerSide));
        assert!(!role_covers(Role::CustomerPerson, task::Kind::Dual));
        assert!(role_covers(Role::Dual, task::Kind::Dual));
        assert!(role_covers(Role::Manager, task::Kind::FileSide));
        assert!(!role_covers(Role::Coordinator, task::Kind::FileSide));
    }
}
