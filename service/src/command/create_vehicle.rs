//! [`Command`] for registering a new [`Vehicle`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::vehicle::{Make, Mileage, Model, Plate, Vin, Year};
use crate::{
    domain::{client, vehicle, Client, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// Database constraint keeping [`vehicle::Plate`]s unique.
pub(crate) const PLATE_CONSTRAINT: &str = "vehicles_plate_key";

/// [`Command`] for registering a new [`Vehicle`] of a [`Client`].
#[derive(Clone, Debug)]
pub struct CreateVehicle {
    /// ID of the [`Client`] owning a new [`Vehicle`].
    pub client_id: client::Id,

    /// [`Plate`] of a new [`Vehicle`].
    pub plate: vehicle::Plate,

    /// [`Make`] of a new [`Vehicle`].
    pub make: vehicle::Make,

    /// [`Model`] of a new [`Vehicle`].
    pub model: vehicle::Model,

    /// [`Year`] of a new [`Vehicle`].
    pub year: Option<vehicle::Year>,

    /// [`Mileage`] of a new [`Vehicle`].
    pub mileage: Option<vehicle::Mileage>,

    /// [`Vin`] of a new [`Vehicle`].
    pub vin: Option<vehicle::Vin>,
}

impl<Db, Au> Command<CreateVehicle> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Vehicle>, &'l vehicle::Plate>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateVehicle {
            client_id,
            plate,
            make,
            model,
            year,
            mileage,
            vin,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let v = self
            .database()
            .execute(Select(By::new(&plate)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if v.is_some() {
            return Err(tracerr::new!(E::PlateOccupied(plate)));
        }

        let vehicle = Vehicle {
            id: vehicle::Id::new(),
            client_id,
            plate,
            make,
            model,
            year,
            mileage,
            vin,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx.execute(Insert(vehicle.clone())).await;
        if inserted.as_ref().is_err_and(|e| {
            e.as_ref().is_unique_violation(Some(PLATE_CONSTRAINT))
        }) {
            // Lost a race with a concurrent registration.
            return Err(tracerr::new!(E::PlateOccupied(vehicle.plate)));
        }
        inserted
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(vehicle)
    }
}

/// Error of [`CreateVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`vehicle::Plate`] is registered for another [`Vehicle`] already.
    #[display("`{_0}` plate is occupied")]
    #[from(ignore)]
    PlateOccupied(#[error(not(source))] vehicle::Plate),
}
