//! [`Advertiser`] operations.

use common::operations::{Delete, Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{advertiser, phone::Phone, review, Advertiser},
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
};

use super::{impl_allocate, impl_select};

impl_allocate!(Advertiser, advertiser::Id, "advertisers");

impl common::Handler<Insert<Advertiser>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(advertiser): Insert<Advertiser>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.advertisers.contains_key(&advertiser.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "advertisers_pkey",
                    });
                }
                if state
                    .advertisers
                    .values()
                    .any(|a| a.phone == advertiser.phone)
                {
                    return Err(Error::UniqueViolation {
                        constraint: "advertisers_phone_key",
                    });
                }
                let _ = state.advertisers.insert(advertiser.id, advertiser);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<Advertiser>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(advertiser): Update<Advertiser>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.advertisers.contains_key(&advertiser.id) {
                    return Err(Error::RowMissing {
                        table: "advertisers",
                    });
                }
                let _ = state.advertisers.insert(advertiser.id, advertiser);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Delete<advertiser::Id>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<advertiser::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.advertisers.remove(&id).is_none() {
                    return Err(Error::RowMissing {
                        table: "advertisers",
                    });
                }
                state.reviews.retain(|_, r| {
                    r.subject != review::Subject::Advertiser(id)
                });
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<Advertiser>, by: advertiser::Id, |state, id| {
    state.advertisers.get(&id).cloned()
});

impl_select!(Option<Advertiser>, by: Phone, |state, phone| {
    state.advertisers.values().find(|a| a.phone == phone).cloned()
});
