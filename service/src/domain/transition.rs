//! Cross-entity transition validation.
//!
//! Every significant entity carries a paired open
//! [`ReviewTask`](crate::domain::ReviewTask); a manager verdict submits
//! the pair `(entity status, review condition)` atomically and this module
//! decides whether the pair is legal. One table-driven function covers all
//! review kinds.

use derive_more::{Display, Error};

use crate::domain::{approval, meeting, review, task};

/// Proposed status of the entity half of a verdict pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PairStatus {
    /// Status of a listing, customer or advertiser.
    Approval(approval::Status),

    /// Status of a visit or session.
    Meeting(meeting::Status),

    /// Status of a task.
    Task(task::Status),
}

/// Outcome of a legal verdict pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The pair advances both halves.
    Apply,

    /// The pair restates the current state and changes nothing.
    Noop,
}

/// Rejection of a verdict pair, naming both sides.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("illegal `{kind}` verdict pair: {entity} / {review}")]
pub struct PairTransitionError {
    /// [`review::Kind`] the pair was submitted against.
    pub kind: review::Kind,

    /// Message describing the entity half.
    pub entity: String,

    /// Message describing the review half.
    pub review: String,
}

/// Rejection of a plain (unpaired) state transition.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("illegal transition from `{from}` to `{to}`")]
pub struct StateTransitionError {
    /// Status the entity is in.
    pub from: String,

    /// Status the transition proposed.
    pub to: String,
}

impl StateTransitionError {
    /// Creates a new [`StateTransitionError`] out of the two statuses.
    #[must_use]
    pub fn new(from: impl ToString, to: impl ToString) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Validates a verdict pair against the legal table of the provided
/// [`review::Kind`].
///
/// # Errors
///
/// Returns a [`PairTransitionError`] naming both sides whenever the pair
/// is not in the legal set.
pub fn validate_pair(
    kind: review::Kind,
    entity: PairStatus,
    condition: review::Condition,
) -> Result<Outcome, PairTransitionError> {
    use review::Condition::{Closed, Open};

    let reject = |entity_msg: &str, review_msg: &str| PairTransitionError {
        kind,
        entity: entity_msg.into(),
        review: review_msg.into(),
    };

    match kind {
        review::Kind::NewSaleListing
        | review::Kind::NewRentListing
        | review::Kind::NewBuyer
        | review::Kind::NewRenter
        | review::Kind::NewAdvertiser => {
            let PairStatus::Approval(status) = entity else {
                return Err(reject(
                    "status does not belong to an approval entity",
                    "kind mismatch",
                ));
            };
            match (status, condition) {
                (approval::Status::Accepted, Closed)
                | (approval::Status::Canceled, Closed) => Ok(Outcome::Apply),
                (approval::Status::Pending, Open) => Ok(Outcome::Noop),
                (approval::Status::Pending, Closed) => Err(reject(
                    "entity left pending",
                    "review cannot close without a verdict",
                )),
                (
                    approval::Status::Accepted | approval::Status::Canceled,
                    Open,
                ) => Err(reject(
                    "verdict issued",
                    "review must close together with the verdict",
                )),
            }
        }
        review::Kind::NewVisit | review::Kind::NewSession => {
            let PairStatus::Meeting(status) = entity else {
                return Err(reject(
                    "status does not belong to a visit or session",
                    "kind mismatch",
                ));
            };
            match (status, condition) {
                (meeting::Status::Accepted, Closed)
                | (meeting::Status::Canceled, Closed) => Ok(Outcome::Apply),
                (meeting::Status::Submitted, Open) => Ok(Outcome::Noop),
                (meeting::Status::Submitted, Closed) => Err(reject(
                    "meeting left submitted",
                    "review cannot close without a verdict",
                )),
                (
                    meeting::Status::Accepted | meeting::Status::Canceled,
                    Open,
                ) => Err(reject(
                    "verdict issued",
                    "review must close together with the verdict",
                )),
                (
                    meeting::Status::Done | meeting::Status::ResultConfirmed,
                    _,
                ) => Err(reject(
                    "result states belong to the result phase",
                    "acceptance review cannot process results",
                )),
            }
        }
        review::Kind::VisitResult | review::Kind::SessionResult => {
            let PairStatus::Meeting(status) = entity else {
                return Err(reject(
                    "status does not belong to a visit or session",
                    "kind mismatch",
                ));
            };
            match (status, condition) {
                (meeting::Status::ResultConfirmed, Closed) => {
                    Ok(Outcome::Apply)
                }
                (meeting::Status::Done, Open) => Ok(Outcome::Noop),
                (meeting::Status::Done, Closed) => Err(reject(
                    "result left unconfirmed",
                    "review cannot close without confirmation",
                )),
                (meeting::Status::ResultConfirmed, Open) => Err(reject(
                    "result confirmed",
                    "review must close together with the confirmation",
                )),
                (
                    meeting::Status::Submitted
                    | meeting::Status::Accepted
                    | meeting::Status::Canceled,
                    _,
                ) => Err(reject(
                    "meeting has no recorded result",
                    "result review expects a done meeting",
                )),
            }
        }
        review::Kind::TaskDelivery => {
            let PairStatus::Task(status) = entity else {
                return Err(reject(
                    "status does not belong to a task",
                    "kind mismatch",
                ));
            };
            match (status, condition) {
                (task::Status::Closed, Closed) => Ok(Outcome::Apply),
                (task::Status::Delivered, Open) => Ok(Outcome::Noop),
                (task::Status::Open, _) => Err(reject(
                    "task was not delivered",
                    "delivery review expects a delivered task",
                )),
                (task::Status::Delivered, Closed) => Err(reject(
                    "task left delivered",
                    "closing the review alone is forbidden",
                )),
                (task::Status::Closed, Open) => Err(reject(
                    "task closed",
                    "review must close together with the task",
                )),
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{validate_pair, Outcome, PairStatus};
    use crate::domain::{approval, meeting, review, task};

    #[test]
    fn approval_pairs() {
        use approval::Status::{Accepted, Canceled, Pending};
        use review::Condition::{Closed, Open};

        for kind in [
            review::Kind::NewSaleListing,
            review::Kind::NewRentListing,
            review::Kind::NewBuyer,
            review::Kind::NewRenter,
            review::Kind::NewAdvertiser,
        ] {
            let check = |status, condition| {
                validate_pair(kind, PairStatus::Approval(status), condition)
            };

            assert_eq!(check(Accepted, Closed), Ok(Outcome::Apply));
            assert_eq!(check(Canceled, Closed), Ok(Outcome::Apply));
            assert_eq!(check(Pending, Open), Ok(Outcome::Noop));

            assert!(check(Pending, Closed).is_err());
            assert!(check(Accepted, Open).is_err());
            assert!(check(Canceled, Open).is_err());
        }
    }

    #[test]
    fn rejected_pair_names_both_sides() {
        let err = validate_pair(
            review::Kind::NewSaleListing,
            PairStatus::Approval(approval::Status::Accepted),
            review::Condition::Open,
        )
        .unwrap_err();

        assert_eq!(err.kind, review::Kind::NewSaleListing);
        assert!(!err.entity.is_empty());
        assert!(!err.review.is_empty());
    }

    #[test]
    fn meeting_acceptance_pairs() {
        use meeting::Status as S;
        use review::Condition::{Closed, Open};

        for kind in [review::Kind::NewVisit, review::Kind::NewSession] {
            let check = |status, condition| {
                validate_pair(kind, PairStatus::Meeting(status), condition)
            };

            assert_eq!(check(S::Accepted, Closed), Ok(Outcome::Apply));
            assert_eq!(check(S::Canceled, Closed), Ok(Outcome::Apply));
            assert_eq!(check(S::Submitted, Open), Ok(Outcome::Noop));

            assert!(check(S::Submitted, Closed).is_err());
            assert!(check(S::Done, Closed).is_err());
            assert!(check(S::Done, Open).is_err());
            assert!(check(S::ResultConfirmed, Closed).is_err());
            assert!(check(S::ResultConfirmed, Open).is_err());
        }
    }

    #[test]
    fn meeting_result_pairs() {
        use meeting::Status as S;
        use review::Condition::{Closed, Open};

        for kind in [review::Kind::VisitResult, review::Kind::SessionResult] {
            let check = |status, condition| {
                validate_pair(kind, PairStatus::Meeting(status), condition)
            };

            assert_eq!(
                check(S::ResultConfirmed, Closed),
                Ok(Outcome::Apply),
            );
            assert_eq!(check(S::Done, Open), Ok(Outcome::Noop));

            assert!(check(S::Done, Closed).is_err());
            assert!(check(S::ResultConfirmed, Open).is_err());
            assert!(check(S::Accepted, Closed).is_err());
            assert!(check(S::Submitted, Open).is_err());
        }
    }

    #[test]
    fn task_pairs() {
        use review::Condition::{Closed, Open};
        use task::Status as S;

        let check = |status, condition| {
            validate_pair(
                review::Kind::TaskDelivery,
                PairStatus::Task(status),
                condition,
            )
        };

        assert_eq!(check(S::Closed, Closed), Ok(Outcome::Apply));
        assert_eq!(check(S::Delivered, Open), Ok(Outcome::Noop));

        assert!(check(S::Open, Closed).is_err());
        assert!(check(S::Open, Open).is_err());
        assert!(check(S::Delivered, Closed).is_err());
        assert!(check(S::Closed, Open).is_err());
    }

    #[test]
    fn kind_and_status_shape_must_agree() {
        assert!(validate_pair(
            review::Kind::TaskDelivery,
            PairStatus::Approval(approval::Status::Accepted),
            review::Condition::Closed,
        )
        .is_err());

        assert!(validate_pair(
            review::Kind::NewVisit,
            PairStatus::Task(task::Status::Closed),
            review::Condition::Closed,
        )
        .is_err());
    }
}
