//! [`Command`] for submitting a manager verdict pair.

use common::{
    operations::{
        Allocate, By, Commit, Insert, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        agent, approval, listing, meeting, notification,
        permission::{self, Action, EntityKind},
        review,
        transition::{
            self, PairStatus, PairTransitionError, StateTransitionError,
        },
        Advertiser, Agent, Buyer, Meeting, Notification, RentListing, Renter,
        ReviewTask, SaleListing, Task,
    },
    infra::{storage, Storage},
    read, Service,
};

use super::Command;

/// [`Command`] for submitting a manager verdict: the paired
/// `(entity status, review condition)` transition.
///
/// The pair is validated against the legal table and committed inside one
/// transaction; a listing's first acceptance additionally fans a
/// [`Notification`] out to every other active agent once the transaction
/// has committed.
#[derive(Clone, Debug)]
pub struct SubmitVerdict {
    /// ID of the [`Agent`] issuing the verdict.
    pub initiator_id: agent::Id,

    /// ID of the [`ReviewTask`] the verdict is submitted against.
    pub review_id: review::Id,

    /// Proposed status of the entity half.
    pub entity_status: PairStatus,

    /// Proposed condition of the review half.
    pub condition: review::Condition,

    /// Note the manager leaves on a visit or session verdict, if any.
    pub note: Option<meeting::ManagerNote>,
}

/// Output of a [`SubmitVerdict`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// The review task after the verdict.
    pub review: ReviewTask,

    /// Whether the pair advanced or restated the current state.
    pub outcome: transition::Outcome,
}

/// Fan-out details of a listing that just got accepted for the first
/// time.
#[derive(Clone, Copy, Debug)]
struct AcceptedListing {
    /// The accepted listing.
    subject: notification::Subject,

    /// The agent who filed it.
    creator: agent::Id,
}

impl<Db> Command<SubmitVerdict> for Service<Db>
where
    Db: Storage<
            Select<By<Option<Agent>, agent::Id>>,
            Ok = Option<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Option<ReviewTask>, review::Id>>,
            Ok = Option<ReviewTask>,
            Err = Traced<storage::Error>,
        > + Storage<
            Select<By<Vec<Agent>, read::agent::Active>>,
            Ok = Vec<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Select<By<Option<ReviewTask>, review::Id>>,
            Ok = Option<ReviewTask>,
            Err = Traced<storage::Error>,
        > + Storage<Update<ReviewTask>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<SaleListing>, listing::sale::Id>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<Update<SaleListing>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<RentListing>, listing::rent::Id>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<Update<RentListing>, Err = Traced<storage::Error>>
        + Storage<
            Select<
                By<Option<Buyer>, crate::domain::customer::buyer::Id>,
            >,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Buyer>, Err = Traced<storage::Error>>
        + Storage<
            Select<
                By<Option<Renter>, crate::domain::customer::renter::Id>,
            >,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Renter>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Advertiser>, crate::domain::advertiser::Id>>,
            Ok = Option<Advertiser>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Advertiser>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Meeting>, meeting::Id>>,
            Ok = Option<Meeting>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Meeting>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Task>, crate::domain::task::Id>>,
            Ok = Option<Task>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Task>, Err = Traced<storage::Error>>
        + Storage<
            Allocate<Notification>,
            Ok = notification::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Notification>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitVerdict,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitVerdict {
            initiator_id,
            review_id,
            entity_status,
            condition,
            note,
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
            EntityKind::ReviewTask,
            Action::Update,
        ) {
            return Err(tracerr::new!(E::Forbidden {
                role: initiator.role,
            }));
        }

        let review = self
            .database()
            .execute(Select(By::<Option<ReviewTask>, _>::new(review_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReviewNotExists(review_id))
            .map_err(tracerr::wrap!())?;

        match transition::validate_pair(review.kind, entity_status, condition)
            .map_err(E::PairTransition)
            .map_err(tracerr::wrap!())?
        {
            transition::Outcome::Noop => {
                return Ok(Output {
                    review,
                    outcome: transition::Outcome::Noop,
                });
            }
            transition::Outcome::Apply => {}
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut review = tx
            .execute(Select(By::<Option<ReviewTask>, _>::new(review_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReviewNotExists(review_id))
            .map_err(tracerr::wrap!())?;

        if review.condition == review::Condition::Closed {
            return Err(tracerr::new!(E::PairTransition(
                PairTransitionError {
                    kind: review.kind,
                    entity: "verdict already issued".into(),
                    review: "review is already closed".into(),
                },
            )));
        }

        let accepted_listing = apply_entity_half(
            self,
            &tx,
            &review,
            entity_status,
            note,
        )
        .await?;

        review.condition = review::Condition::Closed;
        tx.execute(Update(review.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // The fan-out reacts to the committed acceptance; its failure must
        // never fail the verdict itself.
        if let Some(accepted) = accepted_listing {
            if let Err(e) = self.fan_out(accepted).await {
                tracing::warn!(
                    "notification fan-out failed after listing \
                     acceptance: {e}",
                );
            }
        }

        Ok(Output {
            review,
            outcome: transition::Outcome::Apply,
        })
    }
}

/// Applies the entity half of a validated verdict pair inside the
/// caller's transaction.
async fn apply_entity_half<Db, Tx>(
    service: &Service<Db>,
    tx: &Tx,
    review: &ReviewTask,
    entity_status: PairStatus,
    note: Option<meeting::ManagerNote>,
) -> Result<Option<AcceptedListing>, Traced<ExecutionError>>
where
    Tx: Storage<
            Select<By<Option<SaleListing>, listing::sale::Id>>,
            Ok = Option<SaleListing>,
            Err = Traced<storage::Error>,
        > + Storage<Update<SaleListing>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<RentListing>, listing::rent::Id>>,
            Ok = Option<RentListing>,
            Err = Traced<storage::Error>,
        > + Storage<Update<RentListing>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Buyer>, crate::domain::customer::buyer::Id>>,
            Ok = Option<Buyer>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Buyer>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Renter>, crate::domain::customer::renter::Id>>,
            Ok = Option<Renter>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Renter>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Advertiser>, crate::domain::advertiser::Id>>,
            Ok = Option<Advertiser>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Advertiser>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Meeting>, meeting::Id>>,
            Ok = Option<Meeting>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Meeting>, Err = Traced<storage::Error>>
        + Storage<
            Select<By<Option<Task>, crate::domain::task::Id>>,
            Ok = Option<Task>,
            Err = Traced<storage::Error>,
        > + Storage<Update<Task>, Err = Traced<storage::Error>>,
{
    use ExecutionError as E;

    let mismatch = || {
        tracerr::new!(E::PairTransition(PairTransitionError {
            kind: review.kind,
            entity: "proposed status does not fit the mirrored entity".into(),
            review: "kind mismatch".into(),
        }))
    };

    match (review.subject, entity_status) {
        (
            review::Subject::SaleListing(id),
            PairStatus::Approval(to),
        ) => {
            let mut row = tx
                .execute(Select(By::<Option<SaleListing>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            guard_approval(row.status, to)?;
            row.status = to;
            let accepted = if to == approval::Status::Accepted
                && row.expires_at.is_none()
            {
                let now = DateTime::now();
                row.accepted_at = Some(now.coerce());
                row.expires_at =
                    Some((now + service.config().listing_expiry).coerce());
                Some(AcceptedListing {
                    subject: notification::Subject::SaleListing(id),
                    creator: row.agent_id,
                })
            } else {
                None
            };
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(accepted)
        }
        (
            review::Subject::RentListing(id),
            PairStatus::Approval(to),
        ) => {
            let mut row = tx
                .execute(Select(By::<Option<RentListing>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            guard_approval(row.status, to)?;
            row.status = to;
            let accepted = if to == approval::Status::Accepted
                && row.expires_at.is_none()
            {
                let now = DateTime::now();
                row.accepted_at = Some(now.coerce());
                row.expires_at =
                    Some((now + service.config().listing_expiry).coerce());
                Some(AcceptedListing {
                    subject: notification::Subject::RentListing(id),
                    creator: row.agent_id,
                })
            } else {
                None
            };
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(accepted)
        }
        (review::Subject::Buyer(id), PairStatus::Approval(to)) => {
            let mut row = tx
                .execute(Select(By::<Option<Buyer>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            guard_approval(row.status, to)?;
            row.status = to;
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(None)
        }
        (review::Subject::Renter(id), PairStatus::Approval(to)) => {
            let mut row = tx
                .execute(Select(By::<Option<Renter>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            guard_approval(row.status, to)?;
            row.status = to;
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(None)
        }
        (review::Subject::Advertiser(id), PairStatus::Approval(to)) => {
            let mut row = tx
                .execute(Select(By::<Option<Advertiser>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            guard_approval(row.status, to)?;
            row.status = to;
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(None)
        }
        (review::Subject::Meeting(id), PairStatus::Meeting(to)) => {
            let mut row = tx
                .execute(Select(By::<Option<Meeting>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            if !row.status.may_become(to) {
                return Err(tracerr::new!(E::StateTransition(
                    StateTransitionError::new(row.status, to),
                )));
            }
            row.status = to;
            match to {
                meeting::Status::Accepted | meeting::Status::Canceled => {
                    row.manager_note = note;
                }
                meeting::Status::ResultConfirmed => {
                    row.final_comment = note;
                }
                meeting::Status::Submitted | meeting::Status::Done => {}
            }
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(None)
        }
        (review::Subject::Task(id), PairStatus::Task(to)) => {
            let mut row = tx
                .execute(Select(By::<Option<Task>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::SubjectNotExists)
                .map_err(tracerr::wrap!())?;
            if !row.status.may_become(to) {
                return Err(tracerr::new!(E::StateTransition(
                    StateTransitionError::new(row.status, to),
                )));
            }
            row.status = to;
            tx.execute(Update(row))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            Ok(None)
        }
        (
            review::Subject::SaleListing(_)
            | review::Subject::RentListing(_)
            | review::Subject::Buyer(_)
            | review::Subject::Renter(_)
            | review::Subject::Advertiser(_)
            | review::Subject::Meeting(_)
            | review::Subject::Task(_),
            _,
        ) => Err(mismatch()),
    }
}

/// Guards an approval-status transition.
fn guard_approval(
    from: approval::Status,
    to: approval::Status,
) -> Result<(), Traced<ExecutionError>> {
    if from.may_become(to) {
        Ok(())
    } else {
        Err(tracerr::new!(ExecutionError::StateTransition(
            StateTransitionError::new(from, to),
        )))
    }
}

impl<Db> Service<Db>
where
    Db: Storage<
            Select<By<Vec<Agent>, read::agent::Active>>,
            Ok = Vec<Agent>,
            Err = Traced<storage::Error>,
        > + Storage<Transact, Err = Traced<storage::Error>>,
    Transacted<Db>: Storage<
            Allocate<Notification>,
            Ok = notification::Id,
            Err = Traced<storage::Error>,
        > + Storage<Insert<Notification>, Err = Traced<storage::Error>>
        + Storage<Commit, Err = Traced<storage::Error>>,
{
    /// Creates the acceptance [`Notification`] addressed to every active
    /// agent but the listing's creator, and drops their cached unread
    /// counters.
    async fn fan_out(
        &self,
        accepted: AcceptedListing,
    ) -> Result<(), Traced<storage::Error>> {
        let recipients: std::collections::BTreeSet<agent::Id> = self
            .database()
            .execute(Select(By::<Vec<Agent>, _>::new(read::agent::Active)))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|a| a.id)
            .filter(|id| *id != accepted.creator)
            .collect();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        let id = tx
            .execute(Allocate::new())
            .await
            .map_err(tracerr::wrap!())?;

        let notification = Notification {
            id,
            kind: notification::Kind::ListingAccepted,
            subject: accepted.subject,
            creator: accepted.creator,
            recipients: recipients.clone(),
            viewed_by: std::collections::BTreeSet::new(),
            active: true,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(notification))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        self.unread().invalidate_all(recipients).await;

        Ok(())
    }
}

/// Error of [`SubmitVerdict`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Agent`] with the provided ID does not exist.
    #[display("`Agent(id: {_0})` does not exist")]
    AgentNotExists(#[error(not(source))] agent::Id),

    /// Storage operation failed.
    #[display("`Storage` operation failed: {_0}")]
    #[from]
    Db(storage::Error),

    /// The permission matrix denied the action.
    #[display("`{role}` role may not issue verdicts")]
    Forbidden {
        /// Role the denial applies to.
        role: agent::Role,
    },

    /// The verdict pair is not in the legal set.
    #[display("{_0}")]
    PairTransition(PairTransitionError),

    /// [`ReviewTask`] with the provided ID does not exist.
    #[display("`ReviewTask(id: {_0})` does not exist")]
    ReviewNotExists(#[error(not(source))] review::Id),

    /// The entity half rejects the proposed transition.
    #[display("{_0}")]
    StateTransition(StateTransitionError),

    /// The mirrored entity of the review task no longer exists.
    #[display("mirrored entity does not exist")]
    SubjectNotExists,
}
