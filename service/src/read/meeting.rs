//! [`Meeting`]-related read definitions.

#[cfg(doc)]
use crate::domain::Meeting;

pub mod list {
    //! [`Meeting`](crate::domain::Meeting) list definitions.

    use common::define_pagination;

    use crate::domain::{agent, meeting};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = meeting::Id;

    /// Cursor pointing to a specific meeting in a list.
    pub type Cursor = meeting::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Agent to list meetings of.
        pub agent: Option<agent::Id>,

        /// Class (visit or session) to list meetings of.
        pub class: Option<meeting::Class>,

        /// Status to list meetings in.
        pub status: Option<meeting::Status>,
    }
}
