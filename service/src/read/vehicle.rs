//! [`Vehicle`] read model definitions.
//!
//! [`Vehicle`]: crate::domain::Vehicle

pub mod list {
    //! [`Vehicle`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{client, vehicle};
    #[cfg(doc)]
    use crate::domain::{Client, Vehicle};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = vehicle::Id;

    /// Cursor pointing to a specific [`Vehicle`] in a list.
    pub type Cursor = vehicle::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Client`] owning the [`Vehicle`]s.
        pub client_id: Option<client::Id>,

        /// [`vehicle::Plate`] (or its part) to search for.
        pub plate: Option<vehicle::Plate>,
    }

    /// Total count of [`Vehicle`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
