//! [`CatalogItem`] read model definitions.
//!
//! [`CatalogItem`]: crate::domain::CatalogItem

pub mod list {
    //! [`CatalogItem`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::catalog;
    #[cfg(doc)]
    use crate::domain::CatalogItem;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = catalog::Id;

    /// Cursor pointing to a specific [`CatalogItem`] in a list.
    pub type Cursor = catalog::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`catalog::Kind`] to filter by.
        pub kind: Option<catalog::Kind>,

        /// [`catalog::Label`] (or its part) to fuzzy search for.
        pub label: Option<catalog::Label>,
    }

    /// Total count of [`CatalogItem`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
