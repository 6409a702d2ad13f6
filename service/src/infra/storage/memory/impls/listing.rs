//! Listing operations.

use common::operations::{Delete, Insert, Update};
use tracerr::Traced;

use crate::{
    domain::{
        bookmark, code::{Code, UrlId}, listing, notification, review,
        RentListing, SaleListing,
    },
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
    read,
};

use super::{impl_allocate, impl_select, paginate};

impl_allocate!(SaleListing, listing::sale::Id, "sale_listings");
impl_allocate!(RentListing, listing::rent::Id, "rent_listings");

impl common::Handler<Insert<SaleListing>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<SaleListing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.sale_listings.contains_key(&listing.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "sale_listings_pkey",
                    });
                }
                if state
                    .sale_listings
                    .values()
                    .any(|l| l.code == listing.code)
                {
                    return Err(Error::UniqueViolation {
                        constraint: "sale_listings_code_key",
                    });
                }
                if state
                    .sale_listings
                    .values()
                    .any(|l| l.url_id == listing.url_id)
                {
                    return Err(Error::UniqueViolation {
                        constraint: "sale_listings_url_id_key",
                    });
                }
                let _ = state.sale_listings.insert(listing.id, listing);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<SaleListing>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(listing): Update<SaleListing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.sale_listings.contains_key(&listing.id) {
                    return Err(Error::RowMissing {
                        table: "sale_listings",
                    });
                }
                let _ = state.sale_listings.insert(listing.id, listing);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Delete<listing::sale::Id>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<listing::sale::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.sale_listings.remove(&id).is_none() {
                    return Err(Error::RowMissing {
                        table: "sale_listings",
                    });
                }
                // Cascade over the referencing tables.
                state.bookmarks.retain(|_, b| {
                    b.target != bookmark::Target::SaleListing(id)
                });
                state.reviews.retain(|_, r| {
                    r.subject != review::Subject::SaleListing(id)
                });
                state.notifications.retain(|_, n| {
                    n.subject != notification::Subject::SaleListing(id)
                });
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Insert<RentListing>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<RentListing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.rent_listings.contains_key(&listing.id) {
                    return Err(Error::UniqueViolation {
                        constraint: "rent_listings_pkey",
                    });
                }
                if state
                    .rent_listings
                    .values()
                    .any(|l| l.code == listing.code)
                {
                    return Err(Error::UniqueViolation {
                        constraint: "rent_listings_code_key",
                    });
                }
                if state
                    .rent_listings
                    .values()
                    .any(|l| l.url_id == listing.url_id)
                {
                    return Err(Error::UniqueViolation {
                        constraint: "rent_listings_url_id_key",
                    });
                }
                let _ = state.rent_listings.insert(listing.id, listing);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Update<RentListing>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Update(listing): Update<RentListing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if !state.rent_listings.contains_key(&listing.id) {
                    return Err(Error::RowMissing {
                        table: "rent_listings",
                    });
                }
                let _ = state.rent_listings.insert(listing.id, listing);
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl common::Handler<Delete<listing::rent::Id>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<listing::rent::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        self.client()
            .try_mutate(|state| {
                if state.rent_listings.remove(&id).is_none() {
                    return Err(Error::RowMissing {
                        table: "rent_listings",
                    });
                }
                state.bookmarks.retain(|_, b| {
                    b.target != bookmark::Target::RentListing(id)
                });
                state.reviews.retain(|_, r| {
                    r.subject != review::Subject::RentListing(id)
                });
                state.notifications.retain(|_, n| {
                    n.subject != notification::Subject::RentListing(id)
                });
                Ok(())
            })
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl_select!(Option<SaleListing>, by: listing::sale::Id, |state, id| {
    state.sale_listings.get(&id).cloned()
});

impl_select!(Option<RentListing>, by: listing::rent::Id, |state, id| {
    state.rent_listings.get(&id).cloned()
});

impl_select!(Option<SaleListing>, by: Code, |state, code| {
    state.sale_listings.values().find(|l| l.code == code).cloned()
});

impl_select!(Option<RentListing>, by: Code, |state, code| {
    state.rent_listings.values().find(|l| l.code == code).cloned()
});

impl_select!(Option<SaleListing>, by: UrlId, |state, url_id| {
    state.sale_listings.values().find(|l| l.url_id == url_id).cloned()
});

impl_select!(Option<RentListing>, by: UrlId, |state, url_id| {
    state.rent_listings.values().find(|l| l.url_id == url_id).cloned()
});

impl_select!(Vec<SaleListing>, by: (), |state, _all| {
    state.sale_listings.values().cloned().collect()
});

impl_select!(Vec<RentListing>, by: (), |state, _all| {
    state.rent_listings.values().cloned().collect()
});

impl_select!(
    read::listing::sale::Page,
    by: read::listing::sale::Selector,
    |state, selector| {
        let filter = selector.filter;
        let ids: Vec<_> = state
            .sale_listings
            .values()
            .filter(|l| {
                filter
                    .sub_district
                    .map_or(true, |sd| l.location.sub_district == sd)
            })
            .filter(|l| filter.status.map_or(true, |s| l.status == s))
            .filter(|l| {
                filter.include_delete_requested || !l.delete_requested
            })
            .map(|l| l.id)
            .collect();
        paginate(ids, &selector.arguments)
    }
);

impl_select!(
    read::listing::rent::Page,
    by: read::listing::rent::Selector,
    |state, selector| {
        let filter = selector.filter;
        let ids: Vec<_> = state
            .rent_listings
            .values()
            .filter(|l| {
                filter
                    .sub_district
                    .map_or(true, |sd| l.location.sub_district == sd)
            })
            .filter(|l| filter.status.map_or(true, |s| l.status == s))
            .filter(|l| {
                filter.include_delete_requested || !l.delete_requested
            })
            .map(|l| l.id)
            .collect();
        paginate(ids, &selector.arguments)
    }
);
