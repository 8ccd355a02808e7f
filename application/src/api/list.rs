//! Paginated GraphQL lists definitions.

/// Defines `Cursor`, `Edge`, `Connection` and `PageInfo` GraphQL types of a
/// paginated list of the provided `node` entity.
///
/// Must be invoked in a child module of the one defining the `node` entity
/// and its `Id`, with `read` naming the [`service::read`] module of the
/// entity.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_list {
    (
        node = $node:ident,
        read = $read:ident,
        cursor = $cursor:literal,
        edge = $edge:literal,
        connection = $connection:literal,
        page_info = $page_info:literal $(,)?
    ) => {
        use ::derive_more::{AsRef, From, Into};
        use ::juniper::{graphql_object, GraphQLScalar};
        use ::service::{query, read, Query as _};

        use super::{$node, Id};
        use $crate::{api::scalar, AsError, Context, Error};

        /// Cursor of the list.
        #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
        #[from(Id, read::$read::list::Cursor)]
        #[graphql(
            name = $cursor,
            with = scalar::Via::<read::$read::list::Cursor>,
        )]
        pub struct Cursor(pub read::$read::list::Cursor);

        /// Edge in the list.
        #[derive(Clone, Copy, Debug, From, Into)]
        pub struct Edge(read::$read::list::Edge);

        /// Edge in the list.
        #[graphql_object(name = $edge, context = Context)]
        impl Edge {
            /// Cursor of this edge.
            #[must_use]
            pub fn cursor(&self) -> Cursor {
                self.0.cursor.into()
            }

            /// Node of this edge.
            #[must_use]
            pub fn node(&self) -> $node {
                #[expect(
                    unsafe_code,
                    reason = "`Edge` loaded from repository guarantees \
                              node existence"
                )]
                let node = unsafe { $node::new_unchecked(self.0.node) };
                node
            }
        }

        /// Connection of the list.
        #[derive(Clone, Debug, From, Into)]
        pub struct Connection(read::$read::list::Connection);

        /// Connection of the list.
        #[graphql_object(name = $connection, context = Context)]
        impl Connection {
            /// Edges of this connection.
            #[must_use]
            pub fn edges(&self) -> Vec<Edge> {
                self.0.edges.iter().copied().map(Into::into).collect()
            }

            /// Information about the page.
            #[must_use]
            pub fn page_info(&self) -> PageInfo {
                PageInfo {
                    info: self.0.page_info(),
                    start_cursor: self
                        .0
                        .edges
                        .first()
                        .map(|e| e.cursor.into()),
                    end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
                }
            }
        }

        /// Information about a [`Connection`] page.
        #[derive(Clone, Copy, Debug)]
        pub struct PageInfo {
            /// Underlying page information.
            info: read::$read::list::PageInfo,

            /// Start cursor of the page.
            start_cursor: Option<Cursor>,

            /// End cursor of the page.
            end_cursor: Option<Cursor>,
        }

        /// Information about a page of the list.
        #[graphql_object(name = $page_info, context = Context)]
        impl PageInfo {
            /// Indicator whether there is a next page.
            #[must_use]
            pub fn has_next_page(&self) -> bool {
                self.info.has_next_page
            }

            /// Indicator whether there is a previous page.
            #[must_use]
            pub fn has_previous_page(&self) -> bool {
                self.info.has_previous_page
            }

            /// Start cursor of the page.
            #[must_use]
            pub fn start_cursor(&self) -> &Option<Cursor> {
                &self.start_cursor
            }

            /// End cursor of the page.
            #[must_use]
            pub fn end_cursor(&self) -> &Option<Cursor> {
                &self.end_cursor
            }

            /// Total count of nodes, regardless of filters.
            pub async fn total_count(
                &self,
                ctx: &Context,
            ) -> Result<i32, Error> {
                ctx.service()
                    .execute(query::$read::TotalCount::by(()))
                    .await
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .map(Into::into)
            }
        }
    };
}
