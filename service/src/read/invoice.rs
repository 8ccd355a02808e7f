//! [`Invoice`] read model definitions.
//!
//! [`Invoice`]: crate::domain::Invoice

pub mod list {
    //! [`Invoice`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{client, invoice};
    #[cfg(doc)]
    use crate::domain::{Client, Invoice};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = invoice::Id;

    /// Cursor pointing to a specific [`Invoice`] in a list.
    pub type Cursor = invoice::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// ID of the [`Client`] the [`Invoice`]s are addressed to.
        pub client_id: Option<client::Id>,

        /// [`invoice::PaymentStatus`] to filter by, as of today.
        pub payment_status: Option<invoice::PaymentStatus>,
    }

    /// Total count of [`Invoice`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
