//! [`Command`] for scheduling a new [`Meeting`] (visit or session).

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
        meeting,
        permission::{self, Action, EntityKind},
        review,
        validation::{Invalid, Invalids},
        Agent, Buyer, Meeting, RentListing, Renter, ReviewTask, SaleListing,
    },
    infra::{storage, Storage},
    Service,
};

use super::{mint_free_meeting_code, spawn_review, Command};

/// [`Command`] for scheduling a new [`Meeting`].
#[derive(Clone, Debug)]
pub struct ScheduleMeeting {
    /// ID of the [`Agent`] scheduling the meeting.
    pub initiator_id: agent::Id,

    /// [`meeting::Class`] of the new meeting.
    pub class: meeting::Class,

    /// Business-calendar day of the meeting.
    pub date: calendar::Date,

    /// Time-of-day slot of the meeting.
    pub slot: meeting::Slot,

    /// Listing and customer references of the meeting.
    pub refs: meeting::Refs,

    /// Free-form note, if any.
    pub description: Option<meeting::ResultText>,
}

impl<Db> Command<ScheduleMeeting> for Service<Db>
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
            Allocate<Meeting>,
            Ok = meeting::Id,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<Meeting>, (meeting::Class, Code)>>,
            Ok = Option<Meeting>,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Meeting>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<ReviewTask>, Code>>,
            Ok = Option<ReviewTask>,
            Err = Traced<storage::Error>,
        > + Storage<
            Allocate<ReviewTask>,
            Ok = review::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<ReviewTask>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Meeting;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ScheduleMeeting,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ScheduleMeeting {
            initiator_id,
            class,
            date,
            slot,
            refs,
            description,
        } = cmd;

        let initiator = self
            .database()
            .execute(Select(By::<Option<Agent>, _>::new(initiator_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AgentNotExists(initiator_id))
            .map_err(tracerr::wrap!())?;

        let entity_kind = match class {
            meeting::Class::Visit => EntityKind::Visit,
            meeting::Class::Session => EntityKind::Session,
        };
        if !permission::authorize(
            Some(initiator.role),
            entity_kind,
            Action::Create,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
                class,
            }));
        }

        let mut invalids = Invalids::new();

        if date < calendar::Date::today() {
            invalids.push(Invalid::new("date", "date lies in the past"));
        }

        // The referenced listing and customer must exist and must share a
        // sub-district the customer is interested in.
        match &refs {
            meeting::Refs::Sale { listing, buyer } => {
                let listing_row = self
                    .database()
                    .execute(Select(By::<Option<SaleListing>, _>::new(
                        listing.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let buyer_row = self
                    .database()
                    .execute(Select(By::<Option<Buyer>, _>::new(
                        buyer.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                match (listing_row, buyer_row) {
                    (Some(listing_row), Some(buyer_row)) => {
                        if !buyer_row
                            .interested_sub_districts
                            .contains(&listing_row.location.sub_district)
                        {
                            let message = "listing's sub-district is not \
                                           among the customer's interested \
                                           sub-districts";
                            invalids
                                .push(Invalid::new("listing_code", message));
                            invalids
                                .push(Invalid::new("customer_code", message));
                        }
                    }
                    (listing_row, buyer_row) => {
                        if listing_row.is_none() {
                            invalids.push(Invalid::new(
                                "listing_code",
                                "sale listing does not exist",
                            ));
                        }
                        if buyer_row.is_none() {
                            invalids.push(Invalid::new(
                                "customer_code",
                                "buyer does not exist",
                            ));
                        }
                    }
                }
            }
            meeting::Refs::Rent { listing, renter } => {
                let listing_row = self
                    .database()
                    .execute(Select(By::<Option<RentListing>, _>::new(
                        listing.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let renter_row = self
                    .database()
                    .execute(Select(By::<Option<Renter>, _>::new(
                        renter.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                match (listing_row, renter_row) {
                    (Some(listing_row), Some(renter_row)) => {
                        if !renter_row
                            .interested_sub_districts
                            .contains(&listing_row.location.sub_district)
                        {
                            let message = "listing's sub-district is not \
                                           among the customer's interested \
                                           sub-districts";
                            invalids
                                .push(Invalid::new("listing_code", message));
                            invalids
                                .push(Invalid::new("customer_code", message));
                        }
                    }
                    (listing_row, renter_row) => {
                        if listing_row.is_none() {
                            invalids.push(Invalid::new(
                                "listing_code",
                                "rent listing does not exist",
                            ));
                        }
                        if renter_row.is_none() {
                            invalids.push(Invalid::new(
                                "customer_code",
                                "renter does not exist",
                            ));
                        }
                    }
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

        let code = mint_free_meeting_code(&tx, class)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::<Meeting>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let created = Meeting {
            id,
            code,
            class,
            agent_id: initiator.id,
            date,
            slot,
            refs,
            description,
            result: None,
            status: meeting::Status::Submitted,
            manager_note: None,
            final_comment: None,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(created.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let review_kind = match class {
            meeting::Class::Visit => review::Kind::NewVisit,
            meeting::Class::Session => review::Kind::NewSession,
        };
        spawn_review(&tx, review_kind, review::Subject::Meeting(created.id))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CodeSpaceExhausted)
            .map_err(tracerr::wrap!())
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(created)
    }
}

/// Error of [`ScheduleMeeting`] [`Command`] execution.
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
    #[display("`{role}` role may not schedule a `{class}`")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,

        /// Class that was being scheduled.
        class: meeting::Class,
    },

    /// Field-level validation failed.
    #[display("validation failed: {_0}")]
    Validation(#[error(not(source))] Invalids),
}
