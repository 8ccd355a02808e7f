//! [`Quote`]-related definitions.

use std::future;

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{command, completion, domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, document, scalar, Client, Vehicle},
    define_error, AsError, Context, Error,
};

/// Quote proposed to a `Client` for servicing a `Vehicle`.
#[derive(Clone, Debug)]
pub struct Quote {
    /// ID of this [`Quote`].
    id: Id,

    /// Underlying [`domain::Quote`].
    quote: OnceCell<domain::Quote>,
}

impl From<domain::Quote> for Quote {
    fn from(quote: domain::Quote) -> Self {
        Self {
            id: quote.id.into(),
            quote: OnceCell::new_with(Some(quote)),
        }
    }
}

impl Quote {
    /// Creates a new [`Quote`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Quote`] with the provided ID exists,
    /// otherwise accessing this [`Quote`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            quote: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Quote`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Quote`] doesn't exist.
    async fn quote(&self, ctx: &Context) -> Result<&domain::Quote, Error> {
        let id = self.id.into();
        self.quote
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::quote::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|q| {
                        future::ready(q.ok_or_else(|| {
                            ctx.error()(api::NotExistsError::Quote.into())
                        }))
                    })
            })
            .await
    }
}

/// Quote proposed to a `Client` for servicing a `Vehicle`.
#[graphql_object(context = Context)]
impl Quote {
    /// Unique identifier of this `Quote`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Sequential number of this `Quote`, like `D-2024-00042`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn number(&self, ctx: &Context) -> Result<Number, Error> {
        Ok(self.quote(ctx).await?.number.clone().into())
    }

    /// `Client` this `Quote` is proposed to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client(&self, ctx: &Context) -> Result<Client, Error> {
        let client_id = self.quote(ctx).await?.client_id;
        #[expect(unsafe_code, reason = "foreign key guarantees existence")]
        let client = unsafe { Client::new_unchecked(client_id) };
        Ok(client)
    }

    /// `Vehicle` this `Quote` is about.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.vehicle",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn vehicle(&self, ctx: &Context) -> Result<Vehicle, Error> {
        let vehicle_id = self.quote(ctx).await?.vehicle_id;
        #[expect(unsafe_code, reason = "foreign key guarantees existence")]
        let vehicle = unsafe { Vehicle::new_unchecked(vehicle_id) };
        Ok(vehicle)
    }

    /// Lines of this `Quote`, in their order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.lines",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn lines(
        &self,
        ctx: &Context,
    ) -> Result<Vec<document::Line>, Error> {
        Ok(self
            .quote(ctx)
            .await?
            .lines
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Discount of this `Quote`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.discount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn discount(
        &self,
        ctx: &Context,
    ) -> Result<Option<document::Discount>, Error> {
        Ok(self.quote(ctx).await?.discount.map(Into::into))
    }

    /// Currency this `Quote` is priced in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.currency",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn currency(
        &self,
        ctx: &Context,
    ) -> Result<document::Currency, Error> {
        Ok(self.quote(ctx).await?.currency.into())
    }

    /// Totals of this `Quote`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.totals",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn totals(
        &self,
        ctx: &Context,
    ) -> Result<document::Totals, Error> {
        Ok(self.quote(ctx).await?.totals().into())
    }

    /// Status of this `Quote`, being its kanban column.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.quote(ctx).await?.status.into())
    }

    /// URL of the generated PDF of this `Quote`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.documentUrl",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn document_url(
        &self,
        ctx: &Context,
    ) -> Result<Option<document::Url>, Error> {
        Ok(self.quote(ctx).await?.document_url.clone().map(Into::into))
    }

    /// Comments printed on this `Quote`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.comments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn comments(
        &self,
        ctx: &Context,
    ) -> Result<Option<document::Comments>, Error> {
        Ok(self.quote(ctx).await?.comments.clone().map(Into::into))
    }

    /// `Date` this `Quote` is valid until.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.validUntil",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn valid_until(
        &self,
        ctx: &Context,
    ) -> Result<Option<Date>, Error> {
        Ok(self.quote(ctx).await?.valid_until.map(|d| d.coerce()))
    }

    /// `DateTime` when this `Quote` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.quote(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Quote` was modified the last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn updated_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.quote(ctx).await?.updated_at.coerce())
    }

    /// `DateTime` when this `Quote` was sent to its `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Quote.sentAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn sent_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.quote(ctx).await?.sent_at.map(|d| d.coerce()))
    }
}

/// Unique identifier of a `Quote`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::quote::Id)]
#[into(domain::quote::Id)]
#[graphql(name = "QuoteId", transparent)]
pub struct Id(Uuid);

/// Sequential number of a `Quote`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "QuoteNumber",
    with = scalar::Via::<domain::quote::Number>,
)]
pub struct Number(domain::quote::Number);

/// Status of a `Quote`, being a column of the kanban board.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "QuoteStatus")]
pub enum Status {
    /// `Quote` is being edited.
    Draft,

    /// PDF of the `Quote` has been generated.
    Generated,

    /// `Quote` has been sent to its `Client`.
    Sent,

    /// `Client` accepted the `Quote`.
    Accepted,

    /// `Client` refused the `Quote`.
    Refused,

    /// `Client` should be reminded about the `Quote`.
    ToFollowUp,
}

impl From<domain::quote::Status> for Status {
    fn from(status: domain::quote::Status) -> Self {
        use domain::quote::Status as S;
        match status {
            S::Draft => Self::Draft,
            S::Generated => Self::Generated,
            S::Sent => Self::Sent,
            S::Accepted => Self::Accepted,
            S::Refused => Self::Refused,
            S::ToFollowUp => Self::ToFollowUp,
        }
    }
}

impl From<Status> for domain::quote::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Draft => Self::Draft,
            Status::Generated => Self::Generated,
            Status::Sent => Self::Sent,
            Status::Accepted => Self::Accepted,
            Status::Refused => Self::Refused,
            Status::ToFollowUp => Self::ToFollowUp,
        }
    }
}

/// Kanban board of [`Quote`]s.
#[derive(Clone, Debug, From)]
pub struct Board(read::quote::Board);

/// Kanban board of `Quote`s, having a column per `QuoteStatus`.
#[graphql_object(name = "QuoteBoard", context = Context)]
impl Board {
    /// Columns of this board, in the `QuoteStatus` order.
    #[must_use]
    pub fn columns(&self) -> Vec<Column> {
        self.0.columns.iter().cloned().map(Column).collect()
    }
}

/// Column of a [`Board`].
#[derive(Clone, Debug)]
pub struct Column(read::quote::Column);

/// Column of a `QuoteBoard`.
#[graphql_object(name = "QuoteBoardColumn", context = Context)]
impl Column {
    /// Status of the `Quote`s in this column.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `Quote`s in this column, the most recently modified first.
    #[must_use]
    pub fn quotes(&self) -> Vec<Quote> {
        self.0.quotes.iter().cloned().map(Into::into).collect()
    }

    /// Number of `Quote`s in this column.
    #[must_use]
    pub fn count(&self) -> i32 {
        i32::try_from(self.0.quotes.len()).unwrap_or(i32::MAX)
    }
}

/// Result of changing a [`Quote`] status.
#[derive(Clone, Debug)]
pub struct StatusChange(command::change_quote_status::Output);

impl From<command::change_quote_status::Output> for StatusChange {
    fn from(output: command::change_quote_status::Output) -> Self {
        Self(output)
    }
}

/// Result of changing a `Quote` status.
#[graphql_object(name = "QuoteStatusChange", context = Context)]
impl StatusChange {
    /// `Quote` with its new status.
    #[must_use]
    pub fn quote(&self) -> Quote {
        self.0.quote.clone().into()
    }

    /// Outcome of notifying the automation platform about the change.
    #[must_use]
    pub fn notification(&self) -> Notification {
        use command::change_quote_status::Notification as N;
        match self.0.notification {
            N::NotRequired => Notification::NotRequired,
            N::Sent => Notification::Sent,
            N::Failed(_) => Notification::Failed,
        }
    }

    /// Reason the notification failed, if it did.
    #[must_use]
    pub fn notification_error(&self) -> Option<&str> {
        use command::change_quote_status::Notification as N;
        match &self.0.notification {
            N::Failed(reason) => Some(reason),
            N::NotRequired | N::Sent => None,
        }
    }
}

/// Outcome of notifying the automation platform about a `Quote` status
/// change.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "QuoteNotification")]
pub enum Notification {
    /// Status change doesn't need any notification.
    NotRequired,

    /// Automation platform has been notified.
    Sent,

    /// Automation platform failed, while the status has been changed anyway.
    Failed,
}

/// Outcome of a [`Quote`] document generation.
#[derive(Clone, Debug, From)]
pub struct DocumentGeneration(completion::Outcome);

/// Outcome of a `Quote` document generation.
#[graphql_object(name = "QuoteDocumentGeneration", context = Context)]
impl DocumentGeneration {
    /// Status of the generation.
    #[must_use]
    pub fn status(&self) -> GenerationStatus {
        match self.0 {
            completion::Outcome::Completed(_) => GenerationStatus::Completed,
            completion::Outcome::Failed(_) => GenerationStatus::Failed,
            completion::Outcome::Pending => GenerationStatus::Pending,
        }
    }

    /// URL of the generated document, if completed.
    #[must_use]
    pub fn url(&self) -> Option<document::Url> {
        if let completion::Outcome::Completed(url) = &self.0 {
            Some(url.clone().into())
        } else {
            None
        }
    }

    /// Reason of the failure, if failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        if let completion::Outcome::Failed(reason) = &self.0 {
            Some(reason)
        } else {
            None
        }
    }
}

/// Status of a `Quote` document generation.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "QuoteDocumentStatus")]
pub enum GenerationStatus {
    /// Document is ready.
    Completed,

    /// Automation platform failed to generate the document.
    Failed,

    /// Document is still being generated and will be attached to the
    /// `Quote` once ready.
    Pending,
}

pub mod list {
    //! Definitions related to the [`Quote`] list.

    crate::define_list! {
        node = Quote,
        read = quote,
        cursor = "QuoteListCursor",
        edge = "QuoteListEdge",
        connection = "QuoteListConnection",
        page_info = "QuoteListPageInfo",
    }
}

impl AsError for command::line_draft::Error {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CATALOG_ITEM_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "Line references a missing `CatalogItem`"]
                CatalogItemNotExists,

                #[code = "CURRENCY_MISMATCH"]
                #[status = BAD_REQUEST]
                #[message = "`CatalogItem` is priced in another currency"]
                CurrencyMismatch,
            }
        }

        Some(
            match self {
                Self::CatalogItemNotExists(_) => Error::CatalogItemNotExists,
                Self::CurrencyMismatch(_) => Error::CurrencyMismatch,
            }
            .into(),
        )
    }
}

define_error! {
    enum OwnershipError {
        #[code = "VEHICLE_NOT_OWNED"]
        #[status = BAD_REQUEST]
        #[message = "`Vehicle` belongs to another `Client`"]
        Vehicle,
    }
}

impl AsError for command::create_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::Line(e) => e.try_as_error(),
            Self::VehicleNotExists(_) => {
                Some(api::NotExistsError::Vehicle.into())
            }
            Self::VehicleNotOwned(_) => Some(OwnershipError::Vehicle.into()),
        }
    }
}

impl AsError for command::update_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Line(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
        }
    }
}

impl AsError for command::change_quote_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
        }
    }
}

impl AsError for command::generate_quote_document::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Automation(e) => e.try_as_error(),
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
            Self::VehicleNotExists(_) => {
                Some(api::NotExistsError::Vehicle.into())
            }
        }
    }
}

impl AsError for command::send_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DOCUMENT_NOT_GENERATED"]
                #[status = CONFLICT]
                #[message = "`Quote` document must be generated first"]
                DocumentNotGenerated,

                #[code = "NO_EMAIL"]
                #[status = BAD_REQUEST]
                #[message = "`Client` has no email and none was provided"]
                NoEmail,
            }
        }

        match self {
            Self::Automation(e) => e.try_as_error(),
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::DocumentNotGenerated(_) => {
                Some(Error::DocumentNotGenerated.into())
            }
            Self::NoEmail(_) => Some(Error::NoEmail.into()),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
        }
    }
}

impl AsError for command::delete_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{completion, domain};

    use super::{DocumentGeneration, GenerationStatus, Status};

    #[test]
    fn statuses_convert_both_ways() {
        for &status in domain::quote::Status::ALL {
            assert_eq!(
                domain::quote::Status::from(Status::from(status)),
                status,
            );
        }
    }

    #[test]
    fn exposes_generation_outcome() {
        let url = domain::document::Url::new("https://cdn.example.com/d.pdf")
            .unwrap();

        let done = DocumentGeneration(completion::Outcome::Completed(url));
        assert_eq!(done.status(), GenerationStatus::Completed);
        assert!(done.url().is_some());
        assert!(done.error().is_none());

        let failed =
            DocumentGeneration(completion::Outcome::Failed("boom".into()));
        assert_eq!(failed.status(), GenerationStatus::Failed);
        assert_eq!(failed.error(), Some("boom"));

        let pending = DocumentGeneration(completion::Outcome::Pending);
        assert_eq!(pending.status(), GenerationStatus::Pending);
        assert!(pending.url().is_none());
    }
}
