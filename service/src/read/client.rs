//! [`Client`] read model definitions.
//!
//! [`Client`]: crate::domain::Client

pub mod list {
    //! [`Client`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::client;
    #[cfg(doc)]
    use crate::domain::Client;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = client::Id;

    /// Cursor pointing to a specific [`Client`] in a list.
    pub type Cursor = client::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`client::Name`] (or its part) to fuzzy search for.
        pub name: Option<client::Name>,

        /// [`client::Status`] to filter by.
        pub status: Option<client::Status>,
    }

    /// Total count of [`Client`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
