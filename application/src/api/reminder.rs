//! [`Reminder`]-related definitions.

use std::future;

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{command, domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar, Client, Invoice, Quote},
    define_error, AsError, Context, Error,
};

/// Follow-up task about a `Client`.
#[derive(Clone, Debug)]
pub struct Reminder {
    /// ID of this [`Reminder`].
    id: Id,

    /// Underlying [`domain::Reminder`].
    reminder: OnceCell<domain::Reminder>,
}

impl From<domain::Reminder> for Reminder {
    fn from(reminder: domain::Reminder) -> Self {
        Self {
            id: reminder.id.into(),
            reminder: OnceCell::new_with(Some(reminder)),
        }
    }
}

impl Reminder {
    /// Creates a new [`Reminder`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Reminder`] with the provided ID exists,
    /// otherwise accessing this [`Reminder`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            reminder: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Reminder`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Reminder`] doesn't exist.
    async fn reminder(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Reminder, Error> {
        let id = self.id.into();
        self.reminder
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::reminder::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|r| {
                        future::ready(r.ok_or_else(|| {
                            ctx.error()(api::NotExistsError::Reminder.into())
                        }))
                    })
            })
            .await
    }
}

/// Follow-up task about a `Client`.
#[graphql_object(context = Context)]
impl Reminder {
    /// Unique identifier of this `Reminder`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Client` this `Reminder` is about.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client(&self, ctx: &Context) -> Result<Client, Error> {
        let client_id = self.reminder(ctx).await?.client_id;
        #[expect(unsafe_code, reason = "foreign key guarantees existence")]
        let client = unsafe { Client::new_unchecked(client_id) };
        Ok(client)
    }

    /// `Quote` this `Reminder` is about, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.quote",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn quote(&self, ctx: &Context) -> Result<Option<Quote>, Error> {
        Ok(self.reminder(ctx).await?.quote_id.map(|id| {
            #[expect(unsafe_code, reason = "foreign key guarantees existence")]
            let quote = unsafe { Quote::new_unchecked(id) };
            quote
        }))
    }

    /// `Invoice` this `Reminder` is about, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.invoice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn invoice(
        &self,
        ctx: &Context,
    ) -> Result<Option<Invoice>, Error> {
        Ok(self.reminder(ctx).await?.invoice_id.map(|id| {
            #[expect(unsafe_code, reason = "foreign key guarantees existence")]
            let invoice = unsafe { Invoice::new_unchecked(id) };
            invoice
        }))
    }

    /// Note of this `Reminder`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.note",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn note(&self, ctx: &Context) -> Result<Note, Error> {
        Ok(self.reminder(ctx).await?.note.clone().into())
    }

    /// `Date` this `Reminder` is due on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.dueOn",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn due_on(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.reminder(ctx).await?.due_on.coerce())
    }

    /// Indicator whether this `Reminder` is done.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.isDone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_done(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.reminder(ctx).await?.is_done())
    }

    /// `DateTime` when this `Reminder` was completed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.doneAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn done_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.reminder(ctx).await?.done_at.map(|d| d.coerce()))
    }

    /// `DateTime` when this `Reminder` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reminder.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.reminder(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Reminder`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::reminder::Id)]
#[into(domain::reminder::Id)]
#[graphql(name = "ReminderId", transparent)]
pub struct Id(Uuid);

/// Note of a `Reminder`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReminderNote",
    with = scalar::Via::<domain::reminder::Note>,
)]
pub struct Note(domain::reminder::Note);

pub mod list {
    //! Definitions related to the [`Reminder`] list.

    crate::define_list! {
        node = Reminder,
        read = reminder,
        cursor = "ReminderListCursor",
        edge = "ReminderListEdge",
        connection = "ReminderListConnection",
        page_info = "ReminderListPageInfo",
    }
}

impl AsError for command::create_reminder::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "QUOTE_NOT_OWNED"]
                #[status = BAD_REQUEST]
                #[message = "`Quote` belongs to another `Client`"]
                QuoteNotOwned,

                #[code = "INVOICE_NOT_OWNED"]
                #[status = BAD_REQUEST]
                #[message = "`Invoice` belongs to another `Client`"]
                InvoiceNotOwned,
            }
        }

        match self {
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::InvoiceNotExists(_) => {
                Some(api::NotExistsError::Invoice.into())
            }
            Self::InvoiceNotOwned(_) => Some(Error::InvoiceNotOwned.into()),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
            Self::QuoteNotOwned(_) => Some(Error::QuoteNotOwned.into()),
        }
    }
}

impl AsError for command::complete_reminder::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ReminderNotExists(_) => {
                Some(api::NotExistsError::Reminder.into())
            }
        }
    }
}

impl AsError for command::delete_reminder::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ReminderNotExists(_) => {
                Some(api::NotExistsError::Reminder.into())
            }
        }
    }
}
