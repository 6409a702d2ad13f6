//! [`DailyReport`] definitions.

use std::str::FromStr;

use common::{calendar, define_id, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

use crate::domain::{agent, meeting::ManagerNote};

/// Daily activity report submitted by an agent.
///
/// One report per agent per business day.
#[derive(Clone, Debug)]
pub struct DailyReport {
    /// ID of this [`DailyReport`].
    pub id: Id,

    /// ID of the [`agent::Agent`] who submitted this [`DailyReport`].
    pub agent_id: agent::Id,

    /// Business-calendar day this [`DailyReport`] covers.
    pub date: calendar::Date,

    /// [`Content`] of this [`DailyReport`].
    pub content: Content,

    /// Note left by the manager, if any.
    pub manager_note: Option<ManagerNote>,

    /// Indicator whether the manager closed this [`DailyReport`].
    pub closed: bool,

    /// [`DateTime`] when this [`DailyReport`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    #[doc = "ID of a [`DailyReport`]."]
    Id
}

/// Content of a [`DailyReport`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Content(String);

impl Content {
    /// Creates a new [`Content`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `content` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// Creates a new [`Content`] if the given `content` is valid.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        Self::check(&content).then_some(Self(content))
    }

    /// Checks whether the given `content` is a valid [`Content`].
    fn check(content: impl AsRef<str>) -> bool {
        let content = content.as_ref();
        content.trim() == content
            && !content.is_empty()
            && content.len() <= 4096
    }
}

impl FromStr for Content {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Content`")
    }
}

/// [`DateTime`] when a [`DailyReport`] was created.
pub type CreationDateTime = DateTimeOf<(DailyReport, unit::Creation)>;
