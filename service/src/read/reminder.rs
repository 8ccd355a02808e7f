//! [`Reminder`] read model definitions.
//!
//! [`Reminder`]: crate::domain::Reminder

pub mod list {
    //! [`Reminder`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{client, reminder};
    #[cfg(doc)]
    use crate::domain::{Client, Reminder};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = reminder::Id;

    /// Cursor pointing to a specific [`Reminder`] in a list.
    pub type Cursor = reminder::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Indicator whether done [`Reminder`]s should be listed too.
        pub include_done: bool,

        /// ID of the [`Client`] the [`Reminder`]s are about.
        pub client_id: Option<client::Id>,
    }

    /// Total count of [`Reminder`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
