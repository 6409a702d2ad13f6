//! [`Trade`] definitions.

use std::{str::FromStr, sync::LazyLock};

use common::{calendar, define_id, define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{
    agent,
    code::Code,
    deal,
    listing::{
        rent::{Deposit, Rent},
        sale::Price,
    },
};

/// Recorded closed deal, created out of a successful session.
#[derive(Clone, Debug)]
pub struct Trade {
    /// ID of this [`Trade`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`Trade`], unique among trades.
    pub code: Code,

    /// [`Code`] of the parent session this [`Trade`] grew out of.
    pub session_code: Code,

    /// ID of the [`agent::Agent`] who recorded this [`Trade`].
    pub agent_id: agent::Id,

    /// Business-calendar day this [`Trade`] was closed on.
    pub date: calendar::Date,

    /// Monetary [`Figures`] of this [`Trade`].
    pub figures: Figures,

    /// Registry follow-up code of this [`Trade`], once captured.
    pub followup: Option<FollowupCode>,

    /// Indicator whether the registry follow-up code was captured.
    pub followup_captured: bool,

    /// Contract owner name.
    pub owner: PartyName,

    /// Contract counterparty name.
    pub counterparty: PartyName,

    /// [`DateTime`] when this [`Trade`] was created.
    pub created_at: CreationDateTime,
}

impl Trade {
    /// Returns [`deal::Kind`] of this [`Trade`].
    #[must_use]
    pub fn kind(&self) -> deal::Kind {
        match self.figures {
            Figures::Sale { .. } => deal::Kind::Sale,
            Figures::Rent { .. } => deal::Kind::Rent,
        }
    }

    /// Returns [`Status`] of this [`Trade`].
    #[must_use]
    pub fn status(&self) -> Status {
        if self.followup_captured {
            Status::FollowupCaptured
        } else {
            Status::Created
        }
    }
}

define_id! {
    #[doc = "ID of a [`Trade`]."]
    Id
}

define_kind! {
    #[doc = "Status of a [`Trade`]."]
    enum Status {
        #[doc = "Created, follow-up code not captured yet."]
        Created = 1,

        #[doc = "Registry follow-up code captured."]
        FollowupCaptured = 2,
    }
}

/// Monetary figures of a [`Trade`], per deal side.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Figures {
    /// Figures of a closed sale.
    Sale {
        /// Agreed sale [`Price`].
        price: Price,
    },

    /// Figures of a closed rent.
    Rent {
        /// Agreed [`Deposit`].
        deposit: Deposit,

        /// Agreed monthly [`Rent`].
        rent: Rent,
    },
}

/// Registry follow-up code of a [`Trade`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct FollowupCode(String);

impl FollowupCode {
    /// Creates a new [`FollowupCode`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`FollowupCode`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`FollowupCode`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        !code.is_empty()
            && code.len() <= 64
            && code.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    }
}

impl FromStr for FollowupCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FollowupCode`")
    }
}

/// Name of a contract party, in the business script.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct PartyName(String);

impl PartyName {
    /// Creates a new [`PartyName`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`PartyName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`PartyName`].
    fn check(name: impl AsRef<str>) -> bool {
        /// Regular expression checking [`PartyName`] invariants: business
        /// script letters, whitespace and zero-width non-joiners only.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\p{Arabic}[\p{Arabic}\s\u{200C}]*$")
                .expect("valid regex")
        });

        let name = name.as_ref();
        name.trim() == name && REGEX.is_match(name)
    }
}

impl FromStr for PartyName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `PartyName`")
    }
}

/// [`DateTime`] when a [`Trade`] was created.
pub type CreationDateTime = DateTimeOf<(Trade, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use super::{FollowupCode, Status};
    use crate::domain::listing::sale::Price;

    #[test]
    fn status_follows_capture_flag() {
        let price = Price::new(Money::from_toomans(2_000_000_000)).unwrap();
        let figures = super::Figures::Sale { price };
        // Field-level check without building a whole `Trade`.
        assert!(matches!(figures, super::Figures::Sale { .. }));

        assert_eq!(Status::Created.u8(), 1);
        assert_eq!(Status::FollowupCaptured.u8(), 2);
    }

    #[test]
    fn followup_code_format() {
        assert!(FollowupCode::new("140501-X9").is_some());
        assert!(FollowupCode::new("").is_none());
        assert!(FollowupCode::new("with space").is_none());
    }
}
