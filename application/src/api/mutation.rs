//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money};
use juniper::graphql_object;
use service::{
    command::{self, create_catalog_item::Pricing},
    query, Command as _, Query as _,
};

use crate::{
    api::{self, contact, document},
    AsError, Context, Error, Session,
};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials and contact info.
    ///
    /// The very first `User` may be created without authorization.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUser",
            login = %login,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        login: api::user::Login,
        password: api::user::Password,
        email: Option<contact::Email>,
        phone: Option<contact::Phone>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let users = ctx
            .service()
            .execute(query::user::TotalCount::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        if i32::from(users) > 0 {
            _ = ctx.writable_session().await?;
        }

        ctx.service()
            .execute(command::CreateUser {
                name: name.into(),
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                email: email.map(Into::into),
                phone: phone.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session::User {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createClient",
            kind = ?kind,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_client(
        kind: api::client::Kind,
        name: api::client::Name,
        email: Option<contact::Email>,
        phone: Option<contact::Phone>,
        address: Option<contact::Address>,
        notes: Option<api::client::Notes>,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::CreateClient {
                kind: kind.into(),
                name: name.into(),
                email: email.map(Into::into),
                phone: phone.map(Into::into),
                address: address.map(Into::into),
                notes: notes.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the details of the `Client` with the provided ones.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateClient",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_client(
        id: api::client::Id,
        kind: api::client::Kind,
        name: api::client::Name,
        email: Option<contact::Email>,
        phone: Option<contact::Phone>,
        address: Option<contact::Address>,
        notes: Option<api::client::Notes>,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::UpdateClient {
                client_id: id.into(),
                kind: kind.into(),
                name: name.into(),
                email: email.map(Into::into),
                phone: phone.map(Into::into),
                address: address.map(Into::into),
                notes: notes.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Archives or reactivates the `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "changeClientStatus",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn change_client_status(
        id: api::client::Id,
        status: api::client::Status,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::ChangeClientStatus {
                client_id: id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist;
    /// - `CLIENT_IN_USE` - the `Client` still has vehicles or documents.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteClient",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_client(
        id: api::client::Id,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::DeleteClient {
                client_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Registers a new `Vehicle` of the `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist;
    /// - `PLATE_OCCUPIED` - another `Vehicle` has the same plate;
    /// - `INVALID_YEAR` - the year is out of range;
    /// - `INVALID_MILEAGE` - the mileage is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            gql.name = "createVehicle",
            otel.name = Self::SPAN_NAME,
            plate = %plate,
        ),
    )]
    pub async fn create_vehicle(
        client_id: api::client::Id,
        plate: api::vehicle::Plate,
        make: api::vehicle::Make,
        model: api::vehicle::Model,
        year: Option<i32>,
        mileage: Option<i32>,
        vin: Option<api::vehicle::Vin>,
        ctx: &Context,
    ) -> Result<api::Vehicle, Error> {
        _ = ctx.writable_session().await?;
        let year = api::vehicle::parse_year(year).map_err(ctx.error())?;
        let mileage =
            api::vehicle::parse_mileage(mileage).map_err(ctx.error())?;
        ctx.service()
            .execute(command::CreateVehicle {
                client_id: client_id.into(),
                plate: plate.into(),
                make: make.into(),
                model: model.into(),
                year,
                mileage,
                vin: vin.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the details of the `Vehicle` with the provided ones.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VEHICLE_NOT_EXISTS` - the `Vehicle` does not exist;
    /// - `PLATE_OCCUPIED` - another `Vehicle` has the same plate;
    /// - `INVALID_YEAR` - the year is out of range;
    /// - `INVALID_MILEAGE` - the mileage is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateVehicle",
            id = %id,
            otel.name = Self::SPAN_NAME,
            plate = %plate,
        ),
    )]
    pub async fn update_vehicle(
        id: api::vehicle::Id,
        plate: api::vehicle::Plate,
        make: api::vehicle::Make,
        model: api::vehicle::Model,
        year: Option<i32>,
        mileage: Option<i32>,
        vin: Option<api::vehicle::Vin>,
        ctx: &Context,
    ) -> Result<api::Vehicle, Error> {
        _ = ctx.writable_session().await?;
        let year = api::vehicle::parse_year(year).map_err(ctx.error())?;
        let mileage =
            api::vehicle::parse_mileage(mileage).map_err(ctx.error())?;
        ctx.service()
            .execute(command::UpdateVehicle {
                vehicle_id: id.into(),
                plate: plate.into(),
                make: make.into(),
                model: model.into(),
                year,
                mileage,
                vin: vin.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Vehicle`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VEHICLE_NOT_EXISTS` - the `Vehicle` does not exist;
    /// - `VEHICLE_IN_USE` - the `Vehicle` is referenced by documents.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteVehicle",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_vehicle(
        id: api::vehicle::Id,
        ctx: &Context,
    ) -> Result<api::Vehicle, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::DeleteVehicle {
                vehicle_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds a new labour service to the catalog.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createCatalogService",
            label = %label,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_catalog_service(
        label: api::catalog::Label,
        estimated_time: api::catalog::Hours,
        hourly_rate: Money,
        ctx: &Context,
    ) -> Result<api::CatalogItem, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::CreateCatalogItem {
                label: label.into(),
                pricing: Pricing::Service {
                    estimated_time: estimated_time.into(),
                    hourly_rate,
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds a new spare part to the catalog.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createCatalogPart",
            label = %label,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_catalog_part(
        label: api::catalog::Label,
        reference: Option<api::catalog::PartReference>,
        purchase_price: Money,
        margin: api::catalog::Margin,
        ctx: &Context,
    ) -> Result<api::CatalogItem, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::CreateCatalogItem {
                label: label.into(),
                pricing: Pricing::Part {
                    reference: reference.map(Into::into),
                    purchase_price,
                    margin: margin.into(),
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the `CatalogItem` with a labour service.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CATALOG_ITEM_NOT_EXISTS` - the `CatalogItem` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateCatalogService",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_catalog_service(
        id: api::catalog::Id,
        label: api::catalog::Label,
        estimated_time: api::catalog::Hours,
        hourly_rate: Money,
        ctx: &Context,
    ) -> Result<api::CatalogItem, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::UpdateCatalogItem {
                item_id: id.into(),
                label: label.into(),
                pricing: Pricing::Service {
                    estimated_time: estimated_time.into(),
                    hourly_rate,
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the `CatalogItem` with a spare part.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CATALOG_ITEM_NOT_EXISTS` - the `CatalogItem` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateCatalogPart",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_catalog_part(
        id: api::catalog::Id,
        label: api::catalog::Label,
        reference: Option<api::catalog::PartReference>,
        purchase_price: Money,
        margin: api::catalog::Margin,
        ctx: &Context,
    ) -> Result<api::CatalogItem, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::UpdateCatalogItem {
                item_id: id.into(),
                label: label.into(),
                pricing: Pricing::Part {
                    reference: reference.map(Into::into),
                    purchase_price,
                    margin: margin.into(),
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `CatalogItem` from the catalog.
    ///
    /// Lines already copied from it into documents are kept intact.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CATALOG_ITEM_NOT_EXISTS` - the `CatalogItem` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteCatalogItem",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_catalog_item(
        id: api::catalog::Id,
        ctx: &Context,
    ) -> Result<api::CatalogItem, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::DeleteCatalogItem { item_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new draft `Quote` for the `Vehicle` of the `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist;
    /// - `VEHICLE_NOT_EXISTS` - the `Vehicle` does not exist;
    /// - `VEHICLE_NOT_OWNED` - the `Vehicle` belongs to another `Client`;
    /// - `INVALID_LINE` - a line is malformed;
    /// - `INVALID_DISCOUNT` - both or none of discount values are provided;
    /// - `CATALOG_ITEM_NOT_EXISTS` - a line references a missing
    ///                               `CatalogItem`;
    /// - `CURRENCY_MISMATCH` - a `CatalogItem` is priced in another currency.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            gql.name = "createQuote",
            lines = lines.len(),
            otel.name = Self::SPAN_NAME,
            vehicle_id = %vehicle_id,
        ),
    )]
    pub async fn create_quote(
        client_id: api::client::Id,
        vehicle_id: api::vehicle::Id,
        lines: Vec<document::LineInput>,
        discount: Option<document::DiscountInput>,
        currency: Option<document::Currency>,
        comments: Option<document::Comments>,
        valid_until: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Quote, Error> {
        _ = ctx.writable_session().await?;
        let lines = document::line_drafts(lines)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let discount = document::discount(discount)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        ctx.service()
            .execute(command::CreateQuote {
                client_id: client_id.into(),
                vehicle_id: vehicle_id.into(),
                lines,
                discount,
                currency: currency.map(Into::into),
                comments: comments.map(Into::into),
                valid_until: valid_until.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the lines, discount and comments of the `Quote`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist;
    /// - `INVALID_LINE` - a line is malformed;
    /// - `INVALID_DISCOUNT` - both or none of discount values are provided;
    /// - `CATALOG_ITEM_NOT_EXISTS` - a line references a missing
    ///                               `CatalogItem`;
    /// - `CURRENCY_MISMATCH` - a `CatalogItem` is priced in another currency.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateQuote",
            id = %id,
            lines = lines.len(),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_quote(
        id: api::quote::Id,
        lines: Vec<document::LineInput>,
        discount: Option<document::DiscountInput>,
        comments: Option<document::Comments>,
        valid_until: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Quote, Error> {
        _ = ctx.writable_session().await?;
        let lines = document::line_drafts(lines)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let discount = document::discount(discount)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        ctx.service()
            .execute(command::UpdateQuote {
                quote_id: id.into(),
                lines,
                discount,
                comments: comments.map(Into::into),
                valid_until: valid_until.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Moves the `Quote` to the provided column of the kanban board.
    ///
    /// Accepting or refusing a `Quote` notifies the automation platform.
    /// A failed notification doesn't revert the status change, and is
    /// reported in the result instead.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "changeQuoteStatus",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn change_quote_status(
        id: api::quote::Id,
        status: api::quote::Status,
        ctx: &Context,
    ) -> Result<api::quote::StatusChange, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::ChangeQuoteStatus {
                quote_id: id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Requests the automation platform to generate the PDF of the `Quote`.
    ///
    /// Waits a bounded time for the document. If it isn't ready in time, the
    /// `PENDING` status is returned, and the document is attached to the
    /// `Quote` once the platform reports it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist;
    /// - `AUTOMATION_NOT_CONFIGURED` - no generation webhook is configured;
    /// - `AUTOMATION_TIMEOUT` - the platform didn't answer in time;
    /// - `AUTOMATION_FAILED` - the platform rejected the request.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "generateQuoteDocument",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn generate_quote_document(
        id: api::quote::Id,
        ctx: &Context,
    ) -> Result<api::quote::DocumentGeneration, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::GenerateQuoteDocument { quote_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Emails the generated PDF of the `Quote` to its `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist;
    /// - `DOCUMENT_NOT_GENERATED` - the PDF hasn't been generated yet;
    /// - `NO_EMAIL` - neither the `Client` nor the request has an email;
    /// - `AUTOMATION_NOT_CONFIGURED` - no email webhook is configured;
    /// - `AUTOMATION_TIMEOUT` - the platform didn't answer in time;
    /// - `AUTOMATION_FAILED` - the platform rejected the request.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "sendQuote",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn send_quote(
        id: api::quote::Id,
        email: Option<contact::Email>,
        subject: Option<document::Subject>,
        body: Option<document::Body>,
        ctx: &Context,
    ) -> Result<api::Quote, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::SendQuote {
                quote_id: id.into(),
                email: email.map(Into::into),
                subject: subject.map(Into::into),
                body: body.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Quote`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteQuote",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_quote(
        id: api::quote::Id,
        ctx: &Context,
    ) -> Result<api::Quote, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::DeleteQuote { quote_id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Issues a new `Invoice` to the `Client`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist;
    /// - `VEHICLE_NOT_EXISTS` - the `Vehicle` does not exist;
    /// - `VEHICLE_NOT_OWNED` - the `Vehicle` belongs to another `Client`;
    /// - `INVALID_LINE` - a line is malformed;
    /// - `INVALID_DISCOUNT` - both or none of discount values are provided;
    /// - `CATALOG_ITEM_NOT_EXISTS` - a line references a missing
    ///                               `CatalogItem`;
    /// - `CURRENCY_MISMATCH` - a `CatalogItem` is priced in another currency.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            gql.name = "createInvoice",
            lines = lines.len(),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_invoice(
        client_id: api::client::Id,
        vehicle_id: Option<api::vehicle::Id>,
        lines: Vec<document::LineInput>,
        discount: Option<document::DiscountInput>,
        currency: Option<document::Currency>,
        due_on: Option<Date>,
        comments: Option<document::Comments>,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        _ = ctx.writable_session().await?;
        let lines = document::line_drafts(lines)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let discount = document::discount(discount)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        ctx.service()
            .execute(command::CreateInvoice {
                client_id: client_id.into(),
                vehicle_id: vehicle_id.map(Into::into),
                lines,
                discount,
                currency: currency.map(Into::into),
                due_on: due_on.map(Date::coerce),
                comments: comments.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Issues a new `Invoice` billing the accepted `Quote`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist;
    /// - `QUOTE_NOT_ACCEPTED` - the `Quote` is not accepted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createInvoiceFromQuote",
            otel.name = Self::SPAN_NAME,
            quote_id = %quote_id,
        ),
    )]
    pub async fn create_invoice_from_quote(
        quote_id: api::quote::Id,
        due_on: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::CreateInvoiceFromQuote {
                quote_id: quote_id.into(),
                due_on: due_on.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the lines, discount, due date and comments of the unpaid
    /// `Invoice`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` does not exist;
    /// - `INVOICE_PAID` - the `Invoice` is paid already;
    /// - `INVALID_LINE` - a line is malformed;
    /// - `INVALID_DISCOUNT` - both or none of discount values are provided;
    /// - `CATALOG_ITEM_NOT_EXISTS` - a line references a missing
    ///                               `CatalogItem`;
    /// - `CURRENCY_MISMATCH` - a `CatalogItem` is priced in another currency.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateInvoice",
            id = %id,
            lines = lines.len(),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_invoice(
        id: api::invoice::Id,
        lines: Vec<document::LineInput>,
        discount: Option<document::DiscountInput>,
        due_on: Date,
        comments: Option<document::Comments>,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        _ = ctx.writable_session().await?;
        let lines = document::line_drafts(lines)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let discount = document::discount(discount)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        ctx.service()
            .execute(command::UpdateInvoice {
                invoice_id: id.into(),
                lines,
                discount,
                comments: comments.map(Into::into),
                due_on: due_on.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records the payment of the `Invoice`.
    ///
    /// The payment date defaults to today.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` does not exist;
    /// - `INVOICE_PAID` - the `Invoice` is paid already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "recordInvoicePayment",
            id = %id,
            method = ?method,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn record_invoice_payment(
        id: api::invoice::Id,
        method: api::invoice::PaymentMethod,
        paid_on: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::RecordInvoicePayment {
                invoice_id: id.into(),
                method: method.into(),
                paid_on: paid_on.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Invoice`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteInvoice",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_invoice(
        id: api::invoice::Id,
        ctx: &Context,
    ) -> Result<api::Invoice, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::DeleteInvoice {
                invoice_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Reminder` about the `Client`, optionally pointing to
    /// one of its `Quote`s or `Invoice`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` does not exist;
    /// - `QUOTE_NOT_EXISTS` - the `Quote` does not exist;
    /// - `QUOTE_NOT_OWNED` - the `Quote` belongs to another `Client`;
    /// - `INVOICE_NOT_EXISTS` - the `Invoice` does not exist;
    /// - `INVOICE_NOT_OWNED` - the `Invoice` belongs to another `Client`.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            due_on = %due_on,
            gql.name = "createReminder",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_reminder(
        client_id: api::client::Id,
        quote_id: Option<api::quote::Id>,
        invoice_id: Option<api::invoice::Id>,
        note: api::reminder::Note,
        due_on: Date,
        ctx: &Context,
    ) -> Result<api::Reminder, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::CreateReminder {
                client_id: client_id.into(),
                quote_id: quote_id.map(Into::into),
                invoice_id: invoice_id.map(Into::into),
                note: note.into(),
                due_on: due_on.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Reminder` as done.
    ///
    /// Completing a done `Reminder` changes nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `REMINDER_NOT_EXISTS` - the `Reminder` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "completeReminder",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn complete_reminder(
        id: api::reminder::Id,
        ctx: &Context,
    ) -> Result<api::Reminder, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::CompleteReminder {
                reminder_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Reminder`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `REMINDER_NOT_EXISTS` - the `Reminder` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteReminder",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_reminder(
        id: api::reminder::Id,
        ctx: &Context,
    ) -> Result<api::Reminder, Error> {
        _ = ctx.writable_session().await?;
        ctx.service()
            .execute(command::DeleteReminder {
                reminder_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}
