//! [`Query`] collection related to listings.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{
    domain::{RentListing, SaleListing},
    Query,
};

use super::DatabaseQuery;

/// Queries a list of [`SaleListing`]s.
pub type SaleList = DatabaseQuery<
    By<read::listing::sale::Page, read::listing::sale::Selector>,
>;

/// Queries a list of [`RentListing`]s.
pub type RentList = DatabaseQuery<
    By<read::listing::rent::Page, read::listing::rent::Selector>,
>;
