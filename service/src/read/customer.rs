//! Customer-related read definitions.

pub mod buyer {
    //! [`Buyer`] list definitions.

    use common::define_pagination;

    use crate::domain::{approval, customer, location};
    #[cfg(doc)]
    use crate::domain::Buyer;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = customer::buyer::Id;

    /// Cursor pointing to a specific [`Buyer`] in a list.
    pub type Cursor = customer::buyer::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Sub-district the listed buyers must be interested in.
        pub interested_in: Option<location::sub_district::Id>,

        /// Approval status to list buyers in.
        pub status: Option<approval::Status>,

        /// Indicator whether delete-requested buyers are listed, too.
        ///
        /// Non-manager callers never see them.
        pub include_delete_requested: bool,
    }
}

pub mod renter {
    //! [`Renter`] list definitions.

    use common::define_pagination;

    use crate::domain::{approval, customer, location};
    #[cfg(doc)]
    use crate::domain::Renter;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = customer::renter::Id;

    /// Cursor pointing to a specific [`Renter`] in a list.
    pub type Cursor = customer::renter::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Sub-district the listed renters must be interested in.
        pub interested_in: Option<location::sub_district::Id>,

        /// Approval status to list renters in.
        pub status: Option<approval::Status>,

        /// Indicator whether delete-requested renters are listed, too.
        ///
        /// Non-manager callers never see them.
        pub include_delete_requested: bool,
    }
}
