//! [`Invoice`]-related definitions.

use std::future;

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{command, domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, document, scalar, Client, Quote, Vehicle},
    define_error, AsError, Context, Error,
};

/// Bill issued to a `Client`.
#[derive(Clone, Debug)]
pub struct Invoice {
    /// ID of this [`Invoice`].
    id: Id,

    /// Underlying [`domain::Invoice`].
    invoice: OnceCell<domain::Invoice>,
}

impl From<domain::Invoice> for Invoice {
    fn from(invoice: domain::Invoice) -> Self {
        Self {
            id: invoice.id.into(),
            invoice: OnceCell::new_with(Some(invoice)),
        }
    }
}

impl Invoice {
    /// Creates a new [`Invoice`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Invoice`] with the provided ID exists,
    /// otherwise accessing this [`Invoice`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            invoice: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Invoice`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Invoice`] doesn't exist.
    async fn invoice(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Invoice, Error> {
        let id = self.id.into();
        self.invoice
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::invoice::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|i| {
                        future::ready(i.ok_or_else(|| {
                            ctx.error()(api::NotExistsError::Invoice.into())
                        }))
                    })
            })
            .await
    }
}

/// Bill issued to a `Client`.
#[graphql_object(context = Context)]
impl Invoice {
    /// Unique identifier of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Sequential number of this `Invoice`, like `F-2024-00042`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn number(&self, ctx: &Context) -> Result<Number, Error> {
        Ok(self.invoice(ctx).await?.number.clone().into())
    }

    /// `Client` this `Invoice` is addressed to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client(&self, ctx: &Context) -> Result<Client, Error> {
        let client_id = self.invoice(ctx).await?.client_id;
        #[expect(unsafe_code, reason = "foreign key guarantees existence")]
        let client = unsafe { Client::new_unchecked(client_id) };
        Ok(client)
    }

    /// `Vehicle` this `Invoice` is about, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.vehicle",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn vehicle(
        &self,
        ctx: &Context,
    ) -> Result<Option<Vehicle>, Error> {
        Ok(self.invoice(ctx).await?.vehicle_id.map(|id| {
            #[expect(unsafe_code, reason = "foreign key guarantees existence")]
            let vehicle = unsafe { Vehicle::new_unchecked(id) };
            vehicle
        }))
    }

    /// `Quote` this `Invoice` was created from, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.quote",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn quote(&self, ctx: &Context) -> Result<Option<Quote>, Error> {
        Ok(self.invoice(ctx).await?.quote_id.map(|id| {
            #[expect(unsafe_code, reason = "foreign key guarantees existence")]
            let quote = unsafe { Quote::new_unchecked(id) };
            quote
        }))
    }

    /// Lines of this `Invoice`, in their order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.lines",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn lines(
        &self,
        ctx: &Context,
    ) -> Result<Vec<document::Line>, Error> {
        Ok(self
            .invoice(ctx)
            .await?
            .lines
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Discount of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.discount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn discount(
        &self,
        ctx: &Context,
    ) -> Result<Option<document::Discount>, Error> {
        Ok(self.invoice(ctx).await?.discount.map(Into::into))
    }

    /// Currency this `Invoice` is billed in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.currency",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn currency(
        &self,
        ctx: &Context,
    ) -> Result<document::Currency, Error> {
        Ok(self.invoice(ctx).await?.currency.into())
    }

    /// Totals of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.totals",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn totals(
        &self,
        ctx: &Context,
    ) -> Result<document::Totals, Error> {
        Ok(self.invoice(ctx).await?.totals().into())
    }

    /// `Date` this `Invoice` should be paid by.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.dueOn",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn due_on(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.invoice(ctx).await?.due_on.coerce())
    }

    /// Recorded payment of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.payment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment(
        &self,
        ctx: &Context,
    ) -> Result<Option<Payment>, Error> {
        Ok(self.invoice(ctx).await?.payment.map(Payment))
    }

    /// Payment status of this `Invoice` as of today.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.paymentStatus",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment_status(
        &self,
        ctx: &Context,
    ) -> Result<PaymentStatus, Error> {
        Ok(self.invoice(ctx).await?.payment_status().into())
    }

    /// URL of the generated PDF of this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.documentUrl",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn document_url(
        &self,
        ctx: &Context,
    ) -> Result<Option<document::Url>, Error> {
        Ok(self.invoice(ctx).await?.document_url.clone().map(Into::into))
    }

    /// Comments printed on this `Invoice`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.comments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn comments(
        &self,
        ctx: &Context,
    ) -> Result<Option<document::Comments>, Error> {
        Ok(self.invoice(ctx).await?.comments.clone().map(Into::into))
    }

    /// `DateTime` when this `Invoice` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.invoice(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Invoice` was modified the last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Invoice.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn updated_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.invoice(ctx).await?.updated_at.coerce())
    }
}

/// Recorded payment of an [`Invoice`].
#[derive(Clone, Copy, Debug)]
pub struct Payment(domain::invoice::Payment);

/// Recorded payment of an `Invoice`.
#[graphql_object(name = "InvoicePayment", context = Context)]
impl Payment {
    /// Method the `Invoice` was paid with.
    #[must_use]
    pub fn method(&self) -> PaymentMethod {
        self.0.method.into()
    }

    /// `Date` the `Invoice` was paid on.
    #[must_use]
    pub fn paid_on(&self) -> Date {
        self.0.paid_on.coerce()
    }
}

/// Unique identifier of an `Invoice`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::invoice::Id)]
#[into(domain::invoice::Id)]
#[graphql(name = "InvoiceId", transparent)]
pub struct Id(Uuid);

/// Sequential number of an `Invoice`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "InvoiceNumber",
    with = scalar::Via::<domain::invoice::Number>,
)]
pub struct Number(domain::invoice::Number);

/// Method an `Invoice` was paid with.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentMethod")]
pub enum PaymentMethod {
    /// Cash.
    Cash,

    /// Bank card.
    Card,

    /// Cheque.
    Check,

    /// Bank transfer.
    Transfer,
}

impl From<domain::invoice::PaymentMethod> for PaymentMethod {
    fn from(method: domain::invoice::PaymentMethod) -> Self {
        use domain::invoice::PaymentMethod as M;
        match method {
            M::Cash => Self::Cash,
            M::Card => Self::Card,
            M::Check => Self::Check,
            M::Transfer => Self::Transfer,
        }
    }
}

impl From<PaymentMethod> for domain::invoice::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::Check => Self::Check,
            PaymentMethod::Transfer => Self::Transfer,
        }
    }
}

/// Payment status of an `Invoice`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum PaymentStatus {
    /// Not paid yet, and not due yet.
    Pending,

    /// Payment has been recorded.
    Paid,

    /// Not paid past the due date.
    Overdue,
}

impl From<domain::invoice::PaymentStatus> for PaymentStatus {
    fn from(status: domain::invoice::PaymentStatus) -> Self {
        use domain::invoice::PaymentStatus as S;
        match status {
            S::Pending => Self::Pending,
            S::Paid => Self::Paid,
            S::Overdue => Self::Overdue,
        }
    }
}

impl From<PaymentStatus> for domain::invoice::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Overdue => Self::Overdue,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Invoice`] list.

    crate::define_list! {
        node = Invoice,
        read = invoice,
        cursor = "InvoiceListCursor",
        edge = "InvoiceListEdge",
        connection = "InvoiceListConnection",
        page_info = "InvoiceListPageInfo",
    }
}

define_error! {
    enum PaidError {
        #[code = "INVOICE_PAID"]
        #[status = CONFLICT]
        #[message = "`Invoice` is already paid"]
        Paid,
    }
}

impl AsError for command::create_invoice::ExecutionError {
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
            Self::VehicleNotOwned(_) => {
                Some(api::quote::OwnershipError::Vehicle.into())
            }
        }
    }
}

impl AsError for command::create_invoice_from_quote::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "QUOTE_NOT_ACCEPTED"]
                #[status = CONFLICT]
                #[message = "Only an accepted `Quote` can be invoiced"]
                NotAccepted,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::QuoteNotAccepted(_) => Some(Error::NotAccepted.into()),
            Self::QuoteNotExists(_) => Some(api::NotExistsError::Quote.into()),
        }
    }
}

impl AsError for command::update_invoice::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvoicePaid(_) => Some(PaidError::Paid.into()),
            Self::InvoiceNotExists(_) => {
                Some(api::NotExistsError::Invoice.into())
            }
            Self::Line(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::record_invoice_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvoiceNotExists(_) => {
                Some(api::NotExistsError::Invoice.into())
            }
            Self::InvoicePaid(_) => Some(PaidError::Paid.into()),
        }
    }
}

impl AsError for command::delete_invoice::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvoiceNotExists(_) => {
                Some(api::NotExistsError::Invoice.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command, domain};

    use crate::AsError as _;

    use super::{PaymentMethod, PaymentStatus};

    #[test]
    fn enums_convert_both_ways() {
        for &method in domain::invoice::PaymentMethod::ALL {
            assert_eq!(
                domain::invoice::PaymentMethod::from(PaymentMethod::from(
                    method,
                )),
                method,
            );
        }
        for &status in domain::invoice::PaymentStatus::ALL {
            assert_eq!(
                domain::invoice::PaymentStatus::from(PaymentStatus::from(
                    status,
                )),
                status,
            );
        }
    }

    #[test]
    fn paid_invoices_conflict() {
        let err = command::record_invoice_payment::ExecutionError::InvoicePaid(
            domain::invoice::Id::new(),
        )
        .into_error();
        assert_eq!(err.code, "INVOICE_PAID");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }
}
