//! Deal side shared by listings, meetings and trades.

use common::define_kind;

define_kind! {
    #[doc = "Side of a deal an artifact belongs to."]
    enum Kind {
        #[doc = "A sale deal."]
        Sale = 1,

        #[doc = "A rent deal."]
        Rent = 2,
    }
}
