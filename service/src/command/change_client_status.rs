//! [`Command`] for archiving or unarchiving a [`Client`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for archiving or unarchiving a [`Client`].
#[derive(Clone, Copy, Debug)]
pub struct ChangeClientStatus {
    /// ID of the [`Client`] to change the [`client::Status`] of.
    pub client_id: client::Id,

    /// New [`client::Status`] of the [`Client`].
    pub status: client::Status,
}

impl<Db, Au> Command<ChangeClientStatus> for Service<Db, Au>
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
        > + Database<Update<Client>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ChangeClientStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ChangeClientStatus { client_id, status } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut client = tx
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())?;
        if client.status == status {
            return Ok(client);
        }

        client.status = status;
        tx.execute(Update(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`ChangeClientStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
