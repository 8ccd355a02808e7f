//! [`Vehicle`]-related definitions.

use std::future;

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{command, domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar, Client},
    define_error, AsError, Context, Error,
};

/// Vehicle of a `Client` serviced by the garage.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    id: Id,

    /// Underlying [`domain::Vehicle`].
    vehicle: OnceCell<domain::Vehicle>,
}

impl From<domain::Vehicle> for Vehicle {
    fn from(vehicle: domain::Vehicle) -> Self {
        Self {
            id: vehicle.id.into(),
            vehicle: OnceCell::new_with(Some(vehicle)),
        }
    }
}

impl Vehicle {
    /// Creates a new [`Vehicle`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Vehicle`] with the provided ID exists,
    /// otherwise accessing this [`Vehicle`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            vehicle: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Vehicle`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Vehicle`] doesn't exist.
    async fn vehicle(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Vehicle, Error> {
        let id = self.id.into();
        self.vehicle
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::vehicle::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|v| {
                        future::ready(v.ok_or_else(|| {
                            ctx.error()(api::NotExistsError::Vehicle.into())
                        }))
                    })
            })
            .await
    }
}

/// Vehicle of a `Client` serviced by the garage.
#[graphql_object(context = Context)]
impl Vehicle {
    /// Unique identifier of this `Vehicle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Client` owning this `Vehicle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client(&self, ctx: &Context) -> Result<Client, Error> {
        let client_id = self.vehicle(ctx).await?.client_id;
        #[expect(unsafe_code, reason = "foreign key guarantees existence")]
        let client = unsafe { Client::new_unchecked(client_id) };
        Ok(client)
    }

    /// Registration plate of this `Vehicle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.plate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn plate(&self, ctx: &Context) -> Result<Plate, Error> {
        Ok(self.vehicle(ctx).await?.plate.clone().into())
    }

    /// Make of this `Vehicle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.make",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn make(&self, ctx: &Context) -> Result<Make, Error> {
        Ok(self.vehicle(ctx).await?.make.clone().into())
    }

    /// Model of this `Vehicle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.model",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn model(&self, ctx: &Context) -> Result<Model, Error> {
        Ok(self.vehicle(ctx).await?.model.clone().into())
    }

    /// Year this `Vehicle` was manufactured in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.year",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn year(&self, ctx: &Context) -> Result<Option<i32>, Error> {
        Ok(self
            .vehicle(ctx)
            .await?
            .year
            .map(|y| i32::from(u16::from(y))))
    }

    /// Mileage of this `Vehicle` in kilometers.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.mileage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn mileage(&self, ctx: &Context) -> Result<Option<i32>, Error> {
        self.vehicle(ctx)
            .await?
            .mileage
            .map(|m| i32::try_from(u32::from(m)))
            .transpose()
            .map_err(AsError::into_error)
    }

    /// Vehicle identification number of this `Vehicle`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.vin",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn vin(&self, ctx: &Context) -> Result<Option<Vin>, Error> {
        Ok(self.vehicle(ctx).await?.vin.clone().map(Into::into))
    }

    /// `DateTime` when this `Vehicle` was registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Vehicle.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.vehicle(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Vehicle`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::vehicle::Id)]
#[into(domain::vehicle::Id)]
#[graphql(name = "VehicleId", transparent)]
pub struct Id(Uuid);

/// Registration plate of a `Vehicle`.
///
/// Normalized to the upper case.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "VehiclePlate",
    with = scalar::Via::<domain::vehicle::Plate>,
)]
pub struct Plate(domain::vehicle::Plate);

/// Make of a `Vehicle`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "VehicleMake",
    with = scalar::Via::<domain::vehicle::Make>,
)]
pub struct Make(domain::vehicle::Make);

/// Model of a `Vehicle`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "VehicleModel",
    with = scalar::Via::<domain::vehicle::Model>,
)]
pub struct Model(domain::vehicle::Model);

/// Vehicle identification number of a `Vehicle`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "VehicleVin", with = scalar::Via::<domain::vehicle::Vin>)]
pub struct Vin(domain::vehicle::Vin);

/// Parses the provided GraphQL year into a [`domain::vehicle::Year`].
///
/// # Errors
///
/// If the year is out of the supported range.
pub(crate) fn parse_year(
    year: Option<i32>,
) -> Result<Option<domain::vehicle::Year>, Error> {
    year.map(|y| {
        u16::try_from(y)
            .ok()
            .and_then(domain::vehicle::Year::new)
            .ok_or_else(|| api::InputError::Year.into())
    })
    .transpose()
}

/// Parses the provided GraphQL mileage into a [`domain::vehicle::Mileage`].
///
/// # Errors
///
/// If the mileage is out of the supported range.
pub(crate) fn parse_mileage(
    mileage: Option<i32>,
) -> Result<Option<domain::vehicle::Mileage>, Error> {
    mileage
        .map(|m| {
            u32::try_from(m)
                .ok()
                .and_then(domain::vehicle::Mileage::new)
                .ok_or_else(|| api::InputError::Mileage.into())
        })
        .transpose()
}

pub mod list {
    //! Definitions related to the [`Vehicle`] list.

    crate::define_list! {
        node = Vehicle,
        read = vehicle,
        cursor = "VehicleListCursor",
        edge = "VehicleListEdge",
        connection = "VehicleListConnection",
        page_info = "VehicleListPageInfo",
    }
}

define_error! {
    enum PlateError {
        #[code = "PLATE_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Another `Vehicle` is registered with this plate"]
        Occupied,
    }
}

impl AsError for command::create_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::ClientNotExists(_) => {
                Some(api::NotExistsError::Client.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::PlateOccupied(_) => Some(PlateError::Occupied.into()),
        }
    }
}

impl AsError for command::update_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PlateOccupied(_) => Some(PlateError::Occupied.into()),
            Self::VehicleNotExists(_) => {
                Some(api::NotExistsError::Vehicle.into())
            }
        }
    }
}

impl AsError for command::delete_vehicle::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "VEHICLE_IN_USE"]
                #[status = CONFLICT]
                #[message = "`Vehicle` is referenced by quotes or invoices"]
                InUse,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::VehicleInUse(_) => Some(Error::InUse.into()),
            Self::VehicleNotExists(_) => {
                Some(api::NotExistsError::Vehicle.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{parse_mileage, parse_year};

    #[test]
    fn parses_year() {
        assert_eq!(parse_year(None).unwrap(), None);
        assert_eq!(
            parse_year(Some(2015)).unwrap().map(u16::from),
            Some(2015),
        );
        assert_eq!(parse_year(Some(1700)).unwrap_err().code, "INVALID_YEAR");
        assert_eq!(parse_year(Some(-1)).unwrap_err().code, "INVALID_YEAR");
    }

    #[test]
    fn parses_mileage() {
        assert_eq!(
            parse_mileage(Some(120_000)).unwrap().map(u32::from),
            Some(120_000),
        );
        assert_eq!(
            parse_mileage(Some(-5)).unwrap_err().code,
            "INVALID_MILEAGE",
        );
        assert_eq!(
            parse_mileage(Some(3_000_000)).unwrap_err().code,
            "INVALID_MILEAGE",
        );
    }
}
