//! [`Query`] collection related to customers.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{
    domain::{Buyer, Renter},
    Query,
};

use super::DatabaseQuery;

/// Queries a list of [`Buyer`]s.
pub type BuyerList = DatabaseQuery<
    By<read::customer::buyer::Page, read::customer::buyer::Selector>,
>;

/// Queries a list of [`Renter`]s.
pub type RenterList = DatabaseQuery<
    By<read::customer::renter::Page, read::customer::renter::Selector>,
>;
