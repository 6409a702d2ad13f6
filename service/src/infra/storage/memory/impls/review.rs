//! [`ReviewTask`] operations.

use common::operations::{Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{code::Code, review, ReviewTask},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
};

use super::{impl_allocate, impl_select};

impl_allocate!(ReviewTask, review::Id, "reviews");

impl common::Handler<Insert<ReviewTask>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(review): Insert<ReviewTask>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.reviews.contains_key(&review.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "reviews_pkey",
                    });
                }
                if state.reviews.values().any(|r| r.code == review.code) {
                    return Err(Error::UniqueViolation {
                        constraint: "reviews_code_key",
                    });
                }
                // At most one open review task per mirrored entity.
                if review.condition == review::Condition::Open
                    && state.reviews.values().any(|r| {
                        r.subject == review.subject
                            && r.condition == review::Condition::Open
                    })
                {
                    return Err(Error::UniqueViolation {
                        constraint: "reviews_subject_open_key",
                    });
                }
                let _ = state.reviews.insert(review.id, review);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<ReviewTask>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(review): Update<ReviewTask>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.reviews.contains_key(&review.id) {
                    return Err(Error::RowMissing { table: "reviews" });
                }
                let _ = state.reviews.insert(review.id, review);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<ReviewTask>, by: review::Id, |state, id| {
    state.reviews.get(&id).cloned()
});

impl_select!(Option<ReviewTask>, by: Code, |state, code| {
    state.reviews.values().find(|r| r.code == code).cloned()
});

impl_select!(Option<ReviewTask>, by: review::Subject, |state, subject| {
    // The open review of the mirrored entity, if any.
    state
        .reviews
        .values()
        .find(|r| {
            r.subject == subject && r.condition == review::Condition::Open
        })
        .cloned()
});
