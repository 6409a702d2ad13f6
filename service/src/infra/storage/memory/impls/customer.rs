//! Customer operations.

use common::operations::{Delete, Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{
        bookmark, code::Code, customer, phone::Phone, review, Buyer, Renter,
    },
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
    read,
};

use super::{impl_allocate, impl_select, paginate};

impl_allocate!(Buyer, customer::buyer::Id, "buyers");
impl_allocate!(Renter, customer::renter::Id, "renters");

impl common::Handler<Insert<Buyer>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(buyer): Insert<Buyer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.buyers.contains_key(&buyer.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "buyers_pkey",
                    });
                }
                if state.buyers.values().any(|b| b.code == buyer.code) {
                    return Err(Error::UniqueViolation {
                        constraint: "buyers_code_key",
                    });
                }
                if state.buyers.values().any(|b| b.phone == buyer.phone) {
                    return Err(Error::UniqueViolation {
                        constraint: "buyers_phone_key",
                    });
                }
                let _ = state.buyers.insert(buyer.id, buyer);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Buyer>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(buyer): Update<Buyer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.buyers.contains_key(&buyer.id) {
                    return Err(Error::RowMissing { table: "buyers" });
                }
                let _ = state.buyers.insert(buyer.id, buyer);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Delete<customer::buyer::Id>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<customer::buyer::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.buyers.remove(&id).is_none() {
                    return Err(Error::RowMissing { table: "buyers" });
                }
                state
                    .bookmarks
                    .retain(|_, b| b.target != bookmark::Target::Buyer(id));
                state
                    .reviews
                    .retain(|_, r| r.subject != review::Subject::Buyer(id));
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Insert<Renter>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(renter): Insert<Renter>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.renters.contains_key(&renter.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "renters_pkey",
                    });
                }
                if state.renters.values().any(|r| r.code == renter.code) {
                    return Err(Error::UniqueViolation {
                        constraint: "renters_code_key",
                    });
                }
                if state.renters.values().any(|r| r.phone == renter.phone) {
                    return Err(Error::UniqueViolation {
                        constraint: "renters_phone_key",
                    });
                }
                let _ = state.renters.insert(renter.id, renter);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Renter>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(renter): Update<Renter>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.renters.contains_key(&renter.id) {
                    return Err(Error::RowMissing { table: "renters" });
                }
                let _ = state.renters.insert(renter.id, renter);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Delete<customer::renter::Id>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<customer::renter::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.renters.remove(&id).is_none() {
                    return Err(Error::RowMissing { table: "renters" });
                }
                state
                    .bookmarks
                    .retain(|_, b| b.target != bookmark::Target::Renter(id));
                state
                    .reviews
                    .retain(|_, r| r.subject != review::Subject::Renter(id));
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Buyer>, by: customer::buyer::Id, |state, id| {
    state.buyers.get(&id).cloned()
});

impl_select!(Option<Renter>, by: customer::renter::Id, |state, id| {
    state.renters.get(&id).cloned()
});

impl_select!(Option<Buyer>, by: Code, |state, code| {
    state.buyers.values().find(|b| b.code == code).cloned()
});

impl_select!(Option<Renter>, by: Code, |state, code| {
    state.renters.values().find(|r| r.code == code).cloned()
});

impl_select!(Option<Buyer>, by: Phone, |state, phone| {
    state.buyers.values().find(|b| b.phone == phone).cloned()
});

impl_select!(Option<Renter>, by: Phone, |state, phone| {
    state.renters.values().find(|r| r.phone == phone).cloned()
});

impl_select!(Vec<Buyer>, by: (), |state, _all| {
    state.buyers.values().cloned().collect()
});

impl_select!(Vec<Renter>, by: (), |state, _all| {
    state.renters.values().cloned().collect()
});

impl_select!(
    read::customer::buyer::Page,
    by: read::customer::buyer::Selector,
    |state, selector| {
        let filter = selector.filter;
        let ids: Vec<_> = state
            .buyers
            .values()
            .filter(|b| {
                filter.interested_in.map_or(true, |sd| {
                    b.interested_sub_districts.contains(&sd)
                })
            })
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .filter(|b| {
                filter.include_delete_requested || !b.delete_requested
            })
            .map(|b| b.id)
            .collect();
        paginate(ids, &selector.arguments)
    }
);

impl_select!(
    read::customer::renter::Page,
    by: read::customer::renter::Selector,
    |state, selector| {
        let filter = selector.filter;
        let ids: Vec<_> = state
            .renters
            .values()
            .filter(|r| {
                filter.interested_in.map_or(true, |sd| {
                    r.interested_sub_districts.contains(&sd)
                })
            })
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| {
                filter.include_delete_requested || !r.delete_requested
            })
            .map(|r| r.id)
            .collect();
        paginate(ids, &selector.arguments)
    }
);
