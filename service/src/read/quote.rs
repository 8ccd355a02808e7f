//! [`Quote`] read model definitions.

use crate::domain::{quote, Quote};

/// Kanban board of [`Quote`]s, having a [`Column`] per [`quote::Status`].
#[derive(Clone, Debug)]
pub struct Board {
    /// [`Column`]s of this [`Board`], in [`quote::Status::ALL`] order.
    pub columns: Vec<Column>,
}

impl Board {
    /// Groups the provided [`Quote`]s into a new [`Board`].
    ///
    /// Every [`quote::Status`] has its [`Column`], even an empty one, and
    /// [`Quote`]s keep their relative order inside a [`Column`].
    #[must_use]
    pub fn new(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let mut columns = quote::Status::ALL
            .iter()
            .map(|&status| Column {
                status,
                quotes: vec![],
            })
            .collect::<Vec<_>>();
        for q in quotes {
            if let Some(col) = columns.iter_mut().find(|c| c.status == q.status)
            {
                col.quotes.push(q);
            }
        }
        Self { columns }
    }
}

/// Column of a [`Board`].
#[derive(Clone, Debug)]
pub struct Column {
    /// [`quote::Status`] of all the [`Quote`]s in this [`Column`].
    pub status: quote::Status,

    /// [`Quote`]s in this [`Column`].
    pub quotes: Vec<Quote>,
}

/// Selector of [`quote::Status::Sent`] [`Quote`]s sent before the specified
/// [`quote::SendingDateTime`].
#[derive(Clone, Copy, Debug)]
pub struct SentBefore(pub quote::SendingDateTime);

pub mod list {
    //! [`Quote`]s list definitions.

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{client, quote};
    #[cfg(doc)]
    use crate::domain::{Client, Quote};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = quote::Id;

    /// Cursor pointing to a specific [`Quote`] in a list.
    pub type Cursor = quote::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`quote::Status`] to filter by.
        pub status: Option<quote::Status>,

        /// ID of the [`Client`] the [`Quote`]s are addressed to.
        pub client_id: Option<client::Id>,
    }

    /// Total count of [`Quote`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime};

    use crate::domain::{client, quote, vehicle, Quote};

    use super::Board;

    fn quote(status: quote::Status, seq: i64) -> Quote {
        let now = DateTime::now();
        Quote {
            id: quote::Id::new(),
            number: quote::Number::new(2024, seq),
            client_id: client::Id::new(),
            vehicle_id: vehicle::Id::new(),
            lines: vec![],
            discount: None,
            currency: Currency::Eur,
            status,
            document_url: None,
            comments: None,
            valid_until: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: None,
        }
    }

    #[test]
    fn always_has_six_columns_in_order() {
        let board = Board::new([]);

        let statuses =
            board.columns.iter().map(|c| c.status).collect::<Vec<_>>();
        assert_eq!(statuses, quote::Status::ALL);
        assert!(board.columns.iter().all(|c| c.quotes.is_empty()));
    }

    #[test]
    fn groups_quotes_by_status() {
        let board = Board::new([
            quote(quote::Status::Sent, 1),
            quote(quote::Status::Draft, 2),
            quote(quote::Status::Sent, 3),
        ]);

        let numbers = |status| {
            board
                .columns
                .iter()
                .find(|c| c.status == status)
                .unwrap()
                .quotes
                .iter()
                .map(|q| q.number.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(numbers(quote::Status::Draft), ["D-2024-00002"]);
        assert_eq!(
            numbers(quote::Status::Sent),
            ["D-2024-00001", "D-2024-00003"],
        );
        assert!(numbers(quote::Status::Accepted).is_empty());
    }
}
