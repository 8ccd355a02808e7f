//! [`Command`] for updating a [`Vehicle`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::vehicle::{Make, Mileage, Model, Plate, Vin, Year};
use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::{create_vehicle::PLATE_CONSTRAINT, Command};

/// [`Command`] for updating a [`Vehicle`].
///
/// Every field replaces the current value of the [`Vehicle`].
#[derive(Clone, Debug)]
pub struct UpdateVehicle {
    /// ID of the [`Vehicle`] to be updated.
    pub vehicle_id: vehicle::Id,

    /// New [`Plate`] of the [`Vehicle`].
    pub plate: vehicle::Plate,

    /// New [`Make`] of the [`Vehicle`].
    pub make: vehicle::Make,

    /// New [`Model`] of the [`Vehicle`].
    pub model: vehicle::Model,

    /// New [`Year`] of the [`Vehicle`].
    pub year: Option<vehicle::Year>,

    /// New [`Mileage`] of the [`Vehicle`].
    pub mileage: Option<vehicle::Mileage>,

    /// New [`Vin`] of the [`Vehicle`].
    pub vin: Option<vehicle::Vin>,
}

impl<Db, Au> Command<UpdateVehicle> for Service<Db, Au>
where
    Db: for<'l> Database<
            Select<By<Option<Vehicle>, &'l vehicle::Plate>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Update<Vehicle>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateVehicle {
            vehicle_id,
            plate,
            make,
            model,
            year,
            mileage,
            vin,
        } = cmd;

        let owner = self
            .database()
            .execute(Select(By::new(&plate)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if owner.is_some_and(|v| v.id != vehicle_id) {
            return Err(tracerr::new!(E::PlateOccupied(plate)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits of the same `Vehicle`.
        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        vehicle.plate = plate;
        vehicle.make = make;
        vehicle.model = model;
        vehicle.year = year;
        vehicle.mileage = mileage;
        vehicle.vin = vin;

        let updated = tx.execute(Update(vehicle.clone())).await;
        if updated.as_ref().is_err_and(|e| {
            e.as_ref().is_unique_violation(Some(PLATE_CONSTRAINT))
        }) {
            return Err(tracerr::new!(E::PlateOccupied(vehicle.plate)));
        }
        updated.map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(vehicle)
    }
}

/// Error of [`UpdateVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`vehicle::Plate`] is registered for another [`Vehicle`] already.
    #[display("`{_0}` plate is occupied")]
    #[from(ignore)]
    PlateOccupied(#[error(not(source))] vehicle::Plate),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}
