//! [`Command`] for deleting a [`Vehicle`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};
use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Vehicle`].
///
/// A [`Vehicle`] referenced by a [`Quote`] or an [`Invoice`] can't be
/// deleted.
#[derive(Clone, Copy, Debug)]
pub struct DeleteVehicle {
    /// ID of the [`Vehicle`] to be deleted.
    pub vehicle_id: vehicle::Id,
}

impl<Db, Au> Command<DeleteVehicle> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Vehicle, vehicle::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteVehicle { vehicle_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        let deleted = tx.execute(Delete(By::new(vehicle_id))).await;
        if deleted
            .as_ref()
            .is_err_and(|e| e.as_ref().is_foreign_key_violation(None))
        {
            return Err(tracerr::new!(E::VehicleInUse(vehicle_id)));
        }
        deleted.map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(vehicle)
    }
}

/// Error of [`DeleteVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Vehicle`] is still referenced by other entities.
    #[display("`Vehicle(id: {_0})` is in use")]
    #[from(ignore)]
    VehicleInUse(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
