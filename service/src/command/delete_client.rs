//! [`Command`] for deleting a [`Client`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Quote, Vehicle};
use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Client`].
///
/// A [`Client`] still owning [`Vehicle`]s or referenced by documents can't
/// be deleted, and should be archived instead.
#[derive(Clone, Copy, Debug)]
pub struct DeleteClient {
    /// ID of the [`Client`] to be deleted.
    pub client_id: client::Id,
}

impl<Db, Au> Command<DeleteClient> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Client, client::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Client, client::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteClient { client_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let client = tx
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())?;

        let deleted = tx.execute(Delete(By::new(client_id))).await;
        if deleted
            .as_ref()
            .is_err_and(|e| e.as_ref().is_foreign_key_violation(None))
        {
            return Err(tracerr::new!(E::ClientInUse(client_id)));
        }
        deleted.map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`DeleteClient`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] is still referenced by other entities.
    #[display("`Client(id: {_0})` is in use")]
    #[from(ignore)]
    ClientInUse(#[error(not(source))] client::Id),

    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
