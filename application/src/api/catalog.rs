//! [`CatalogItem`]-related definitions.

use std::future;

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{command, domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError, Context, Error,
};

/// Labour service or spare part offered by the garage.
#[derive(Clone, Debug)]
pub struct CatalogItem {
    /// ID of this [`CatalogItem`].
    id: Id,

    /// Underlying [`domain::CatalogItem`].
    item: OnceCell<domain::CatalogItem>,
}

impl From<domain::CatalogItem> for CatalogItem {
    fn from(item: domain::CatalogItem) -> Self {
        Self {
            id: item.id().into(),
            item: OnceCell::new_with(Some(item)),
        }
    }
}

impl CatalogItem {
    /// Creates a new [`CatalogItem`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`CatalogItem`] with the provided ID exists,
    /// otherwise accessing this [`CatalogItem`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            item: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::CatalogItem`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::CatalogItem`] doesn't exist.
    async fn item(
        &self,
        ctx: &Context,
    ) -> Result<&domain::CatalogItem, Error> {
        let id = self.id.into();
        self.item
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::catalog::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|i| {
                        future::ready(i.ok_or_else(|| {
                            ctx.error()(api::NotExistsError::CatalogItem.into())
                        }))
                    })
            })
            .await
    }

    /// Returns the underlying [`domain::catalog::Service`], if this
    /// [`CatalogItem`] is a service.
    async fn service(
        &self,
        ctx: &Context,
    ) -> Result<Option<&domain::catalog::Service>, Error> {
        Ok(match self.item(ctx).await? {
            domain::CatalogItem::Service(s) => Some(s),
            domain::CatalogItem::Part(_) => None,
        })
    }

    /// Returns the underlying [`domain::catalog::Part`], if this
    /// [`CatalogItem`] is a part.
    async fn part(
        &self,
        ctx: &Context,
    ) -> Result<Option<&domain::catalog::Part>, Error> {
        Ok(match self.item(ctx).await? {
            domain::CatalogItem::Part(p) => Some(p),
            domain::CatalogItem::Service(_) => None,
        })
    }
}

/// Labour service or spare part offered by the garage.
#[graphql_object(context = Context)]
impl CatalogItem {
    /// Unique identifier of this `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Kind of this `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.kind",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.item(ctx).await?.kind().into())
    }

    /// Label of this `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.label",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn label(&self, ctx: &Context) -> Result<Label, Error> {
        Ok(self.item(ctx).await?.label().clone().into())
    }

    /// Price a unit of this `CatalogItem` is sold for, excluding VAT.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.salePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn sale_price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.item(ctx).await?.sale_price().rounded())
    }

    /// Estimated time of this service `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.estimatedTime",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn estimated_time(
        &self,
        ctx: &Context,
    ) -> Result<Option<Hours>, Error> {
        Ok(self.service(ctx).await?.map(|s| s.estimated_time.into()))
    }

    /// Hourly rate of this service `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.hourlyRate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn hourly_rate(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.service(ctx).await?.map(|s| s.hourly_rate))
    }

    /// Manufacturer reference of this part `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.reference",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reference(
        &self,
        ctx: &Context,
    ) -> Result<Option<PartReference>, Error> {
        Ok(self
            .part(ctx)
            .await?
            .and_then(|p| p.reference.clone())
            .map(Into::into))
    }

    /// Purchase price of this part `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.purchasePrice",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn purchase_price(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.part(ctx).await?.map(|p| p.purchase_price))
    }

    /// Margin multiplier of this part `CatalogItem`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.margin",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn margin(
        &self,
        ctx: &Context,
    ) -> Result<Option<Margin>, Error> {
        Ok(self.part(ctx).await?.map(|p| p.margin.into()))
    }

    /// `DateTime` when this `CatalogItem` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "CatalogItem.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.item(ctx).await?.created_at().coerce())
    }
}

/// Unique identifier of a `CatalogItem`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::catalog::Id)]
#[into(domain::catalog::Id)]
#[graphql(name = "CatalogItemId", transparent)]
pub struct Id(Uuid);

/// Label of a `CatalogItem`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CatalogItemLabel",
    with = scalar::Via::<domain::catalog::Label>,
)]
pub struct Label(domain::catalog::Label);

/// Positive decimal number of hours, at most 1000.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Hours", with = scalar::Via::<domain::catalog::Hours>)]
pub struct Hours(domain::catalog::Hours);

/// Decimal multiplier applied to a purchase price, from 1 to 100.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Margin", with = scalar::Via::<domain::catalog::Margin>)]
pub struct Margin(domain::catalog::Margin);

/// Manufacturer reference of a part.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PartReference",
    with = scalar::Via::<domain::catalog::part::Reference>,
)]
pub struct PartReference(domain::catalog::part::Reference);

/// Kind of a `CatalogItem`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "CatalogItemKind")]
pub enum Kind {
    /// Labour service.
    Service,

    /// Spare part.
    Part,
}

impl From<domain::catalog::Kind> for Kind {
    fn from(kind: domain::catalog::Kind) -> Self {
        use domain::catalog::Kind as K;
        match kind {
            K::Service => Self::Service,
            K::Part => Self::Part,
        }
    }
}

impl From<Kind> for domain::catalog::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Service => Self::Service,
            Kind::Part => Self::Part,
        }
    }
}

pub mod list {
    //! Definitions related to the [`CatalogItem`] list.

    crate::define_list! {
        node = CatalogItem,
        read = catalog,
        cursor = "CatalogItemListCursor",
        edge = "CatalogItemListEdge",
        connection = "CatalogItemListConnection",
        page_info = "CatalogItemListPageInfo",
    }
}

define_error! {
    enum PriceError {
        #[code = "PRICE_OUT_OF_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Catalog price must be within `0..=1000000`"]
        OutOfRange,
    }
}

impl AsError for command::create_catalog_item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PriceOutOfRange(_) => Some(PriceError::OutOfRange.into()),
        }
    }
}

impl AsError for command::update_catalog_item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::CatalogItemNotExists(_) => {
                Some(api::NotExistsError::CatalogItem.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::PriceOutOfRange(_) => Some(PriceError::OutOfRange.into()),
        }
    }
}

impl AsError for command::delete_catalog_item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::CatalogItemNotExists(_) => {
                Some(api::NotExistsError::CatalogItem.into())
            }
            Self::Db(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;
    use service::command;

    use crate::AsError as _;

    #[test]
    fn out_of_range_price_is_bad_request() {
        let price = Money::from_str("1000000.01EUR").unwrap();
        let err =
            command::create_catalog_item::ExecutionError::PriceOutOfRange(
                price,
            )
            .into_error();
        assert_eq!(err.code, "PRICE_OUT_OF_RANGE");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
