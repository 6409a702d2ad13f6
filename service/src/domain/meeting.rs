//! [`Meeting`] definitions.
//!
//! Visits and negotiation sessions share one shape and one lifecycle, so
//! both are carried by [`Meeting`] and told apart by [`Class`]. Codes are
//! still minted per class, keeping visits and sessions in their own
//! 6-digit spaces.

use std::str::FromStr;

use common::{calendar, define_id, define_kind, unit, DateTimeOf};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::{Buyer, Renter, RentListing, SaleListing};
use crate::domain::{agent, code::Code, deal};

/// Scheduled visit or negotiation session connecting a listing with a
/// customer.
#[derive(Clone, Debug)]
pub struct Meeting {
    /// ID of this [`Meeting`].
    pub id: Id,

    /// Human-facing [`Code`] of this [`Meeting`], unique within its
    /// [`Class`].
    pub code: Code,

    /// [`Class`] of this [`Meeting`].
    pub class: Class,

    /// ID of the [`agent::Agent`] owning this [`Meeting`].
    pub agent_id: agent::Id,

    /// Business-calendar day this [`Meeting`] is scheduled on.
    pub date: calendar::Date,

    /// Time-of-day [`Slot`] this [`Meeting`] is scheduled in.
    pub slot: Slot,

    /// Listing and customer [`Refs`] of this [`Meeting`].
    pub refs: Refs,

    /// Free-form note attached at scheduling time, if any.
    pub description: Option<ResultText>,

    /// Outcome recorded by the owning agent, if any.
    pub result: Option<ResultText>,

    /// [`Status`] of this [`Meeting`].
    pub status: Status,

    /// Note left by the manager at the acceptance verdict, if any.
    pub manager_note: Option<ManagerNote>,

    /// Final comment left by the manager at the result verdict, if any.
    pub final_comment: Option<ManagerNote>,

    /// [`DateTime`] when this [`Meeting`] was created.
    pub created_at: CreationDateTime,
}

impl Meeting {
    /// Returns [`deal::Kind`] of this [`Meeting`].
    #[must_use]
    pub fn kind(&self) -> deal::Kind {
        self.refs.kind()
    }
}

define_id! {
    #[doc = "ID of a [`Meeting`]."]
    Id
}

define_kind! {
    #[doc = "Class of a [`Meeting`]."]
    enum Class {
        #[doc = "On-site inspection of a listing by a customer."]
        Visit = 1,

        #[doc = "Negotiation meeting following a successful visit."]
        Session = 2,
    }
}

define_kind! {
    #[doc = "Time-of-day slot of a [`Meeting`]."]
    enum Slot {
        #[doc = "Morning slot."]
        Morning = 1,

        #[doc = "Afternoon slot."]
        Afternoon = 2,

        #[doc = "Evening slot."]
        Evening = 3,
    }
}

define_kind! {
    #[doc = "Status of a [`Meeting`]."]
    enum Status {
        #[doc = "Submitted, awaiting the manager's acceptance verdict."]
        Submitted = 1,

        #[doc = "Accepted by the manager."]
        Accepted = 2,

        #[doc = "Canceled by the manager."]
        Canceled = 3,

        #[doc = "Done: the owning agent recorded a result."]
        Done = 4,

        #[doc = "The recorded result was confirmed by the manager."]
        ResultConfirmed = 5,
    }
}

impl Status {
    /// Indicates whether this [`Status`] may legally become the provided
    /// one.
    #[must_use]
    pub fn may_become(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Submitted, Self::Accepted)
                | (Self::Submitted, Self::Canceled)
                | (Self::Accepted, Self::Done)
                | (Self::Done, Self::ResultConfirmed),
        )
    }

    /// Indicates whether this [`Status`] is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled | Self::ResultConfirmed)
    }
}

/// Listing and customer references of a [`Meeting`].
///
/// A sale meeting names exactly one [`SaleListing`] code and one [`Buyer`]
/// code; a rent meeting names exactly one [`RentListing`] code and one
/// [`Renter`] code. The variants make any other combination
/// unrepresentable.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Refs {
    /// Sale side references.
    Sale {
        /// [`Code`] of the [`SaleListing`] being visited or negotiated.
        listing: Code,

        /// [`Code`] of the interested [`Buyer`].
        buyer: Code,
    },

    /// Rent side references.
    Rent {
        /// [`Code`] of the [`RentListing`] being visited or negotiated.
        listing: Code,

        /// [`Code`] of the interested [`Renter`].
        renter: Code,
    },
}

impl Refs {
    /// Returns [`deal::Kind`] of these [`Refs`].
    #[must_use]
    pub fn kind(&self) -> deal::Kind {
        match self {
            Self::Sale { .. } => deal::Kind::Sale,
            Self::Rent { .. } => deal::Kind::Rent,
        }
    }

    /// Returns the [`SaleListing`] [`Code`], if these are sale [`Refs`].
    #[must_use]
    pub fn sale_listing(&self) -> Option<&Code> {
        match self {
            Self::Sale { listing, .. } => Some(listing),
            Self::Rent { .. } => None,
        }
    }

    /// Returns the [`RentListing`] [`Code`], if these are rent [`Refs`].
    #[must_use]
    pub fn rent_listing(&self) -> Option<&Code> {
        match self {
            Self::Rent { listing, .. } => Some(listing),
            Self::Sale { .. } => None,
        }
    }

    /// Returns the [`Buyer`] [`Code`], if these are sale [`Refs`].
    #[must_use]
    pub fn buyer(&self) -> Option<&Code> {
        match self {
            Self::Sale { buyer, .. } => Some(buyer),
            Self::Rent { .. } => None,
        }
    }

    /// Returns the [`Renter`] [`Code`], if these are rent [`Refs`].
    #[must_use]
    pub fn renter(&self) -> Option<&Code> {
        match self {
            Self::Rent { renter, .. } => Some(renter),
            Self::Sale { .. } => None,
        }
    }
}

/// Recorded outcome of a [`Meeting`], or the note attached at scheduling
/// time.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct ResultText(String);

impl ResultText {
    /// Creates a new [`ResultText`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `text` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a new [`ResultText`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`ResultText`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && !text.is_empty() && text.len() <= 2048
    }
}

impl FromStr for ResultText {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ResultText`")
    }
}

/// Note a manager leaves on a [`Meeting`] alongside a verdict.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct ManagerNote(String);

impl ManagerNote {
    /// Creates a new [`ManagerNote`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `note` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(note: impl Into<String>) -> Self {
        Self(note.into())
    }

    /// Creates a new [`ManagerNote`] if the given `note` is valid.
    #[must_use]
    pub fn new(note: impl Into<String>) -> Option<Self> {
        let note = note.into();
        Self::check(&note).then_some(Self(note))
    }

    /// Checks whether the given `note` is a valid [`ManagerNote`].
    fn check(note: impl AsRef<str>) -> bool {
        let note = note.as_ref();
        note.trim() == note && !note.is_empty() && note.len() <= 2048
    }
}

impl FromStr for ManagerNote {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ManagerNote`")
    }
}

/// [`DateTime`] when a [`Meeting`] was created.
pub type CreationDateTime = DateTimeOf<(Meeting, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Code, Refs, Status};

    fn code(s: &str) -> Code {
        Code::new(s).unwrap()
    }

    #[test]
    fn transitions() {
        use Status::{Accepted, Canceled, Done, ResultConfirmed, Submitted};

        assert!(Submitted.may_become(Accepted));
        assert!(Submitted.may_become(Canceled));
        assert!(Accepted.may_become(Done));
        assert!(Done.may_become(ResultConfirmed));

        assert!(!Submitted.may_become(Done));
        assert!(!Submitted.may_become(ResultConfirmed));
        assert!(!Accepted.may_become(Canceled));
        assert!(!Canceled.may_become(Accepted));
        assert!(!ResultConfirmed.may_become(Done));
        assert!(!Done.may_become(Accepted));
    }

    #[test]
    fn refs_are_exclusive_per_side() {
        let sale = Refs::Sale {
            listing: code("111111"),
            buyer: code("222222"),
        };
        assert!(sale.sale_listing().is_some());
        assert!(sale.buyer().is_some());
        assert!(sale.rent_listing().is_none());
        assert!(sale.renter().is_none());

        let rent = Refs::Rent {
            listing: code("333333"),
            renter: code("444444"),
        };
        assert!(rent.rent_listing().is_some());
        assert!(rent.renter().is_some());
        assert!(rent.sale_listing().is_none());
        assert!(rent.buyer().is_none());
    }
}
