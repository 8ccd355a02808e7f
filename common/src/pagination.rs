//! Cursor-based pagination.

use std::fmt;

/// Generic pagination connection.
#[derive(Clone, Debug)]
pub struct Connection<C, I> {
    /// [`Edge`]s in this [`Connection`].
    pub edges: Vec<Edge<C, I>>,

    /// [`Direction`] this [`Connection`] was paginated in.
    pub direction: Direction,

    /// Indicator whether there are more nodes past this [`Connection`].
    pub has_more: bool,
}

/// A page in a [`Connection`].
pub type Page<C, I> = Connection<C, I>;

impl<C, I> Connection<C, I> {
    /// Creates a new [`Connection`] from the provided [`Edge`]s.
    #[must_use]
    pub fn new(
        args: &Arguments<C>,
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect(),
            direction: args.direction(),
            has_more,
        }
    }

    /// Returns [`PageInfo`] of this [`Connection`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            start_cursor: self.edges.first().map(|e| e.cursor.clone()),
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more
                && self.direction == Direction::Forward,
            has_previous_page: self.has_more
                && self.direction == Direction::Backward,
        }
    }
}

/// Information about a page in a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// First cursor on this page.
    pub start_cursor: Option<C>,

    /// Last cursor on this page.
    pub end_cursor: Option<C>,

    /// Indicator whether [`Connection`] has a next page.
    pub has_next_page: bool,

    /// Indicator whether [`Connection`] has a previous page.
    pub has_previous_page: bool,
}

/// An edge in a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor of this [`Edge`].
    pub cursor: C,

    /// Node of this [`Edge`].
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arguments<C> {
    /// Forward pagination.
    Forward {
        /// Number of items to return.
        first: usize,

        /// Cursor after which to return items.
        after: Option<C>,
    },

    /// Backward pagination.
    Backward {
        /// Number of items to return.
        last: usize,

        /// Cursor before which to return items.
        before: Option<C>,
    },
}

impl<C> Arguments<C> {
    /// Creates new [`Arguments`] out of the raw GraphQL-style ones.
    ///
    /// [`None`] is returned if forward and backward arguments are mixed, or
    /// the page size is not representable.
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        last: Option<Num>,
        before: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        Num: TryInto<usize> + fmt::Debug,
    {
        Some(match (first, after, last, before) {
            (first, after, None, None) => Self::Forward {
                first: first.unwrap_or(default).try_into().ok()?,
                after,
            },
            (None, None, Some(last), before) => Self::Backward {
                last: last.try_into().ok()?,
                before,
            },
            _ => return None,
        })
    }

    /// Returns cursor requested by these [`Arguments`].
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { before, .. } => before.as_ref(),
        }
    }

    /// Returns [`Direction`] of pagination these [`Arguments`] request.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Forward { .. } => Direction::Forward,
            Self::Backward { .. } => Direction::Backward,
        }
    }

    /// Returns limit requested by these [`Arguments`].
    #[must_use]
    pub fn limit(&self) -> usize {
        match *self {
            Self::Forward { first, .. } => first,
            Self::Backward { last, .. } => last,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Direction of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Towards the end of the list.
    Forward,

    /// Towards the start of the list.
    Backward,
}

impl Direction {
    /// Returns the comparison operator selecting items past a cursor in this
    /// [`Direction`].
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::Backward => "<",
        }
    }

    /// Returns the SQL order of items in this [`Direction`].
    #[must_use]
    pub const fn sql_order(&self) -> &'static str {
        match self {
            Self::Forward => "ASC",
            Self::Backward => "DESC",
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Edge of a [`Connection`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "A [`Connection`] of nodes."]
        pub type Connection = $crate::pagination::Connection<$cursor, $node>;

        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Connection, Direction};

    #[test]
    fn defaults_to_forward() {
        assert_eq!(
            Arguments::<u8>::new(None, None, None, None, 10),
            Some(Arguments::Forward {
                first: 10,
                after: None,
            }),
        );
        assert_eq!(
            Arguments::new(Some(5), Some(3_u8), None, None, 10),
            Some(Arguments::Forward {
                first: 5,
                after: Some(3),
            }),
        );
    }

    #[test]
    fn accepts_backward() {
        assert_eq!(
            Arguments::new(None, None, Some(2), Some(7_u8), 10),
            Some(Arguments::Backward {
                last: 2,
                before: Some(7),
            }),
        );
    }

    #[test]
    fn rejects_mixed_or_negative() {
        assert_eq!(
            Arguments::new(Some(1), None, Some(1), None::<u8>, 10),
            None,
        );
        assert_eq!(Arguments::new(None, Some(1_u8), Some(1), None, 10), None);
        assert_eq!(Arguments::<u8>::new(Some(-1), None, None, None, 10), None);
    }

    #[test]
    fn page_info_follows_direction() {
        let args = Arguments::new(None, None, Some(2), None::<u8>, 10).unwrap();
        let page = Connection::<u8, u8>::new(&args, [(1, 1), (2, 2)], true);

        let info = page.page_info();
        assert_eq!(page.direction, Direction::Backward);
        assert!(info.has_previous_page);
        assert!(!info.has_next_page);
        assert_eq!(info.start_cursor, Some(1));
        assert_eq!(info.end_cursor, Some(2));
    }
}
