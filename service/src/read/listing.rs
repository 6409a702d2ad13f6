//! Listing-related read definitions.

pub mod sale {
    //! [`SaleListing`] list definitions.

    use common::define_pagination;

    use crate::domain::{approval, listing, location};
    #[cfg(doc)]
    use crate::domain::SaleListing;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = listing::sale::Id;

    /// Cursor pointing to a specific [`SaleListing`] in a list.
    pub type Cursor = listing::sale::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Sub-district to list listings of.
        pub sub_district: Option<location::sub_district::Id>,

        /// Approval status to list listings in.
        pub status: Option<approval::Status>,

        /// Indicator whether delete-requested listings are listed, too.
        ///
        /// Non-manager callers never see them.
        pub include_delete_requested: bool,
    }
}

pub mod rent {
    //! [`RentListing`] list definitions.

    use common::define_pagination;

    use crate::domain::{approval, listing, location};
    #[cfg(doc)]
    use crate::domain::RentListing;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = listing::rent::Id;

    /// Cursor pointing to a specific [`RentListing`] in a list.
    pub type Cursor = listing::rent::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Sub-district to list listings of.
        pub sub_district: Option<location::sub_district::Id>,

        /// Approval status to list listings in.
        pub status: Option<approval::Status>,

        /// Indicator whether delete-requested listings are listed, too.
        ///
        /// Non-manager callers never see them.
        pub include_delete_requested: bool,
    }
}
