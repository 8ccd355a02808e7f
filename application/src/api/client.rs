//! [`Client`]-related definitions.

use std::future;

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{command, domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, contact, scalar},
    define_error, AsError, Context, Error,
};

/// Customer of the garage.
#[derive(Clone, Debug)]
pub struct Client {
    /// ID of this [`Client`].
    id: Id,

    /// Underlying [`domain::Client`].
    client: OnceCell<domain::Client>,
}

impl From<domain::Client> for Client {
    fn from(client: domain::Client) -> Self {
        Self {
            id: client.id.into(),
            client: OnceCell::new_with(Some(client)),
        }
    }
}

impl Client {
    /// Creates a new [`Client`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Client`] with the provided ID exists,
    /// otherwise accessing this [`Client`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            client: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Client`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Client`] doesn't exist.
    async fn client(&self, ctx: &Context) -> Result<&domain::Client, Error> {
        let id = self.id.into();
        self.client
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::client::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            ctx.error()(api::NotExistsError::Client.into())
                        }))
                    })
            })
            .await
    }
}

/// Customer of the garage.
#[graphql_object(context = Context)]
impl Client {
    /// Unique identifier of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Kind of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.kind",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.client(ctx).await?.kind.into())
    }

    /// Name of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.client(ctx).await?.name.clone().into())
    }

    /// Email of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(
        &self,
        ctx: &Context,
    ) -> Result<Option<contact::Email>, Error> {
        Ok(self.client(ctx).await?.email.clone().map(Into::into))
    }

    /// Phone of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(
        &self,
        ctx: &Context,
    ) -> Result<Option<contact::Phone>, Error> {
        Ok(self.client(ctx).await?.phone.clone().map(Into::into))
    }

    /// Postal address of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.address",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn address(
        &self,
        ctx: &Context,
    ) -> Result<Option<contact::Address>, Error> {
        Ok(self.client(ctx).await?.address.clone().map(Into::into))
    }

    /// Internal notes about this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.notes",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn notes(&self, ctx: &Context) -> Result<Option<Notes>, Error> {
        Ok(self.client(ctx).await?.notes.clone().map(Into::into))
    }

    /// Status of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.client(ctx).await?.status.into())
    }

    /// `Vehicle`s of this `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.vehicles",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn vehicles(
        &self,
        first: Option<i32>,
        after: Option<api::vehicle::list::Cursor>,
        last: Option<i32>,
        before: Option<api::vehicle::list::Cursor>,
        ctx: &Context,
    ) -> Result<api::vehicle::list::Connection, Error> {
        api::Query::vehicles(
            first,
            after,
            last,
            before,
            Some(self.id),
            None,
            ctx,
        )
        .await
    }

    /// `DateTime` when this `Client` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Client.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.client(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Client`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::client::Id)]
#[into(domain::client::Id)]
#[graphql(name = "ClientId", transparent)]
pub struct Id(Uuid);

/// Name of a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ClientName",
    with = scalar::Via::<domain::client::Name>,
)]
pub struct Name(domain::client::Name);

/// Internal notes about a `Client`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ClientNotes",
    with = scalar::Via::<domain::client::Notes>,
)]
pub struct Notes(domain::client::Notes);

/// Kind of a `Client`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ClientKind")]
pub enum Kind {
    /// Private person.
    Individual,

    /// Company or a self-employed professional.
    Professional,
}

impl From<domain::client::Kind> for Kind {
    fn from(kind: domain::client::Kind) -> Self {
        use domain::client::Kind as K;
        match kind {
            K::Individual => Self::Individual,
            K::Professional => Self::Professional,
        }
    }
}

impl From<Kind> for domain::client::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Individual => Self::Individual,
            Kind::Professional => Self::Professional,
        }
    }
}

/// Status of a `Client`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ClientStatus")]
pub enum Status {
    /// `Client` is active.
    Active,

    /// `Client` is archived and hidden by default.
    Archived,
}

impl From<domain::client::Status> for Status {
    fn from(status: domain::client::Status) -> Self {
        use domain::client::Status as S;
        match status {
            S::Active => Self::Active,
            S::Archived => Self::Archived,
        }
    }
}

impl From<Status> for domain::client::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Active => Self::Active,
            Status::Archived => Self::Archived,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Client`] list.

    crate::define_list! {
        node = Client,
        read = client,
        cursor = "ClientListCursor",
        edge = "ClientListEdge",
        connection = "ClientListConnection",
        page_info = "ClientListPageInfo",
    }
}

impl AsError for command::update_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::change_client_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CLIENT_IN_USE"]
                #[status = CONFLICT]
                #[message = "`Client` still has vehicles, quotes or \
                             invoices"]
                InUse,
            }
        }

        match self {
            Self::ClientInUse(_) => Some(Error::InUse.into()),
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain;

    use super::{Kind, Status};

    #[test]
    fn kinds_convert_both_ways() {
        for &kind in domain::client::Kind::ALL {
            assert_eq!(domain::client::Kind::from(Kind::from(kind)), kind);
        }
        for &status in domain::client::Status::ALL {
            assert_eq!(
                domain::client::Status::from(Status::from(status)),
                status,
            );
        }
    }
}
