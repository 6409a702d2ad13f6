//! Location hierarchy operations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::location::{
        self, city, district, province, sub_district, City, District,
        Province, SubDistrict,
    },
    infra::storage::{
        self,
        memory::{Error, Memory, Tx},
    },
};

use super::{impl_allocate, impl_select};

impl_allocate!(Province, province::Id, "provinces");
impl_allocate!(City, city::Id, "cities");
impl_allocate!(District, district::Id, "districts");
impl_allocate!(SubDistrict, sub_district::Id, "sub_districts");

/// Implements `Insert` for one location level.
macro_rules! impl_insert_level {
    ($entity:ty, $table:ident, $pkey:literal) => {
        impl common::Handler<Insert<$entity>> for Memory<Tx> {
            type Ok = ();
            type Err = Traced<storage::Error>;

            async fn execute(
                &self,
                Insert(node): Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                self.client()
                    .try_mutate(|state| {
                        if state.$table.contains_key(&node.id) {
                            return Err(Error::UniqueViolation {
                                constraint: $pkey,
                            });
                        }
                        let _ = state.$table.insert(node.id, node);
                        Ok(())
                    })
                    .map_err(tracerr::from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from)
            }
        }
    };
}

impl_insert_level!(Province, provinces, "provinces_pkey");
impl_insert_level!(City, cities, "cities_pkey");
impl_insert_level!(District, districts, "districts_pkey");
impl_insert_level!(SubDistrict, sub_districts, "sub_districts_pkey");

impl_select!(Option<Province>, by: province::Id, |state, id| {
    state.provinces.get(&id).cloned()
});

impl_select!(Option<City>, by: city::Id, |state, id| {
    state.cities.get(&id).cloned()
});

impl_select!(Option<District>, by: district::Id, |state, id| {
    state.districts.get(&id).cloned()
});

impl_select!(Option<SubDistrict>, by: sub_district::Id, |state, id| {
    state.sub_districts.get(&id).cloned()
});

impl_select!(Option<location::Path>, by: location::Path, |state, path| {
    let city_linked = state
        .cities
        .get(&path.city)
        .map_or(false, |c| c.province_id == path.province);
    let district_linked = state
        .districts
        .get(&path.district)
        .map_or(false, |d| d.city_id == path.city);
    let sub_district_linked = state
        .sub_districts
        .get(&path.sub_district)
        .map_or(false, |s| s.district_id == path.district);

    (state.provinces.contains_key(&path.province)
        && city_linked
        && district_linked
        && sub_district_linked)
        .then_some(path)
});
