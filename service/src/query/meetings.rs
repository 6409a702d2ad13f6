//! [`Query`] collection related to meetings.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Meeting, Query};

use super::DatabaseQuery;

/// Queries a list of [`Meeting`]s.
pub type List =
    DatabaseQuery<By<read::meeting::list::Page, read::meeting::list::Selector>>;
