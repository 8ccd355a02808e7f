//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, api::document, AsError, Context, Error};

/// Default size of a page of any list.
const DEFAULT_PAGE_SIZE: i32 = 20;

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// Returns `null` in the demo mode, where no `User` is authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<Option<api::User>, Error> {
        let Some(my_id) = ctx.current_session().await?.user_id() else {
            return Ok(None);
        };
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::User.into())
            .map_err(ctx.error())
            .map(|u| Some(u.into()))
    }

    /// Returns the `Client` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "client",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn client(
        id: api::client::Id,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::client::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::Client.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Client`s, ordered by name.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - pagination is ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "clients",
            last = ?last,
            name = ?name.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn clients(
        first: Option<i32>,
        after: Option<api::client::list::Cursor>,
        last: Option<i32>,
        before: Option<api::client::list::Cursor>,
        name: Option<api::client::Name>,
        status: Option<api::client::Status>,
        ctx: &Context,
    ) -> Result<api::client::list::Connection, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::client::List::by(read::client::list::Selector {
                arguments: read::client::list::Arguments::new(
                    first,
                    after.map(Into::into),
                    last,
                    before.map(Into::into),
                    DEFAULT_PAGE_SIZE,
                )
                .ok_or_else(|| api::PaginationError::Ambiguous.into())
                .map_err(ctx.error())?,
                filter: read::client::list::Filter {
                    name: name.map(Into::into),
                    status: status.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Vehicle` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VEHICLE_NOT_EXISTS` - the `Vehicle` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "vehicle",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn vehicle(
        id: api::vehicle::Id,
        ctx: &Context,
    ) -> Result<api::Vehicle, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::vehicle::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::Vehicle.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Vehicle`s, ordered by plate.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - pagination is ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            client_id = ?client_id.map(|id| id.to_string()),
            first = ?first,
            gql.name = "vehicles",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            plate = ?plate.as_ref().map(ToString::to_string),
        ),
    )]
    pub async fn vehicles(
        first: Option<i32>,
        after: Option<api::vehicle::list::Cursor>,
        last: Option<i32>,
        before: Option<api::vehicle::list::Cursor>,
        client_id: Option<api::client::Id>,
        plate: Option<api::vehicle::Plate>,
        ctx: &Context,
    ) -> Result<api::vehicle::list::Connection, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::vehicle::List::by(
                read::vehicle::list::Selector {
                    arguments: read::vehicle::list::Arguments::new(
                        first,
                        after.map(Into::into),
                        last,
                        before.map(Into::into),
                        DEFAULT_PAGE_SIZE,
                    )
                    .ok_or_else(|| api::PaginationError::Ambiguous.into())
                    .map_err(ctx.error())?,
                    filter: read::vehicle::list::Filter {
                        client_id: client_id.map(Into::into),
                        plate: plate.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `CatalogItem` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CATALOG_ITEM_NOT_EXISTS` - the `CatalogItem` with the specified ID
    ///                               does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "catalogItem",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn catalog_item(
        id: api::catalog::Id,
        ctx: &Context,
    ) -> Result<api::CatalogItem, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::catalog::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::CatalogItem.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `CatalogItem`s, ordered by label.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - pagination is ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "catalogItems",
            kind = ?kind,
            label = ?label.as_ref().map(ToString::to_string),
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn catalog_items(
        first: Option<i32>,
        after: Option<api::catalog::list::Cursor>,
        last: Option<i32>,
        before: Option<api::catalog::list::Cursor>,
        kind: Option<api::catalog::Kind>,
        label: Option<api::catalog::Label>,
        ctx: &Context,
    ) -> Result<api::catalog::list::Connection, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::catalog::List::by(
                read::catalog::list::Selector {
                    arguments: read::catalog::list::Arguments::new(
                        first,
                        after.map(Into::into),
                        last,
                        before.map(Into::into),
                        DEFAULT_PAGE_SIZE,
                    )
                    .ok_or_else(|| api::PaginationError::Ambiguous.into())
                    .map_err(ctx.error())?,
                    filter: read::catalog::list::Filter {
                        kind: kind.map(Into::into),
                        label: label.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Quote` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` with the specified ID does not
    ///                        exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "quote",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn quote(
        id: api::quote::Id,
        ctx: &Context,
    ) -> Result<api::Quote, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::quote::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::Quote.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Quote`s, the most recent first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - pagination is ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            client_id = ?client_id.map(|id| id.to_string()),
            first = ?first,
            gql.name = "quotes",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn quotes(
        first: Option<i32>,
        after: Option<api::quote::list::Cursor>,
        last: Option<i32>,
        before: Option<api::quote::list::Cursor>,
        status: Option<api::quote::Status>,
        client_id: Option<api::client::Id>,
        ctx: &Context,
    ) -> Result<api::quote::list::Connection, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::quote::List::by(read::quote::list::Selector {
                arguments: read::quote::list::Arguments::new(
                    first,
                    after.map(Into::into),
                    last,
                    before.map(Into::into),
                    DEFAULT_PAGE_SIZE,
                )
                .ok_or_else(|| api::PaginationError::Ambiguous.into())
                .map_err(ctx.error())?,
                filter: read::quote::list::Filter {
                    status: status.map(Into::into),
                    client_id: client_id.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the kanban board of all `Quote`s, grouped by their status.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "quoteBoard",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn quote_board(
        ctx: &Context,
    ) -> Result<api::quote::Board, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::quote::Board::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Invoice` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "invoice",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn invoice(
        id: api::invoice::Id,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::invoice::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::Invoice.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Invoice`s, the most recent first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - pagination is ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            client_id = ?client_id.map(|id| id.to_string()),
            first = ?first,
            gql.name = "invoices",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            payment_status = ?payment_status,
        ),
    )]
    pub async fn invoices(
        first: Option<i32>,
        after: Option<api::invoice::list::Cursor>,
        last: Option<i32>,
        before: Option<api::invoice::list::Cursor>,
        client_id: Option<api::client::Id>,
        payment_status: Option<api::invoice::PaymentStatus>,
        ctx: &Context,
    ) -> Result<api::invoice::list::Connection, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::invoice::List::by(
                read::invoice::list::Selector {
                    arguments: read::invoice::list::Arguments::new(
                        first,
                        after.map(Into::into),
                        last,
                        before.map(Into::into),
                        DEFAULT_PAGE_SIZE,
                    )
                    .ok_or_else(|| api::PaginationError::Ambiguous.into())
                    .map_err(ctx.error())?,
                    filter: read::invoice::list::Filter {
                        client_id: client_id.map(Into::into),
                        payment_status: payment_status.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Reminder` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `REMINDER_NOT_EXISTS` - the `Reminder` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "reminder",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reminder(
        id: api::reminder::Id,
        ctx: &Context,
    ) -> Result<api::Reminder, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::reminder::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::NotExistsError::Reminder.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Reminder`s, the soonest due first.
    ///
    /// Done `Reminder`s are omitted unless `includeDone` is `true`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - pagination is ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            client_id = ?client_id.map(|id| id.to_string()),
            first = ?first,
            gql.name = "reminders",
            include_done = ?include_done,
            last = ?last,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reminders(
        first: Option<i32>,
        after: Option<api::reminder::list::Cursor>,
        last: Option<i32>,
        before: Option<api::reminder::list::Cursor>,
        include_done: Option<bool>,
        client_id: Option<api::client::Id>,
        ctx: &Context,
    ) -> Result<api::reminder::list::Connection, Error> {
        _ = ctx.current_session().await?;
        ctx.service()
            .execute(query::reminder::List::by(
                read::reminder::list::Selector {
                    arguments: read::reminder::list::Arguments::new(
                        first,
                        after.map(Into::into),
                        last,
                        before.map(Into::into),
                        DEFAULT_PAGE_SIZE,
                    )
                    .ok_or_else(|| api::PaginationError::Ambiguous.into())
                    .map_err(ctx.error())?,
                    filter: read::reminder::list::Filter {
                        include_done: include_done.unwrap_or(false),
                        client_id: client_id.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Previews the totals of a `Quote` or an `Invoice` being edited.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_LINE` - a line mixes a `CatalogItem` with free fields, or
    ///                    misses required ones;
    /// - `INVALID_DISCOUNT` - both or none of discount values are provided;
    /// - `CATALOG_ITEM_NOT_EXISTS` - a line references a missing
    ///                               `CatalogItem`;
    /// - `CURRENCY_MISMATCH` - a `CatalogItem` is priced in another currency.
    #[tracing::instrument(
        skip_all,
        fields(
            currency = ?currency,
            gql.name = "computeTotals",
            lines = lines.len(),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn compute_totals(
        lines: Vec<document::LineInput>,
        discount: Option<document::DiscountInput>,
        currency: Option<document::Currency>,
        ctx: &Context,
    ) -> Result<document::Totals, Error> {
        _ = ctx.current_session().await?;
        let lines = document::line_drafts(lines)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let discount = document::discount(discount)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        ctx.service()
            .execute(query::ComputeTotals {
                lines,
                discount,
                currency: currency.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for query::totals::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Line(e) => e.try_as_error(),
        }
    }
}
