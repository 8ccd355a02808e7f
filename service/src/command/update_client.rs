//! [`Command`] for updating a [`Client`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::client::{Address, Email, Kind, Name, Notes, Phone};
use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Client`].
///
/// Every field replaces the current value of the [`Client`].
#[derive(Clone, Debug)]
pub struct UpdateClient {
    /// ID of the [`Client`] to be updated.
    pub client_id: client::Id,

    /// New [`Kind`] of the [`Client`].
    pub kind: client::Kind,

    /// New [`Name`] of the [`Client`].
    pub name: client::Name,

    /// New [`Email`] of the [`Client`].
    pub email: Option<client::Email>,

    /// New [`Phone`] of the [`Client`].
    pub phone: Option<client::Phone>,

    /// New [`Address`] of the [`Client`].
    pub address: Option<client::Address>,

    /// New [`Notes`] about the [`Client`].
    pub notes: Option<client::Notes>,
}

impl<Db, Au> Command<UpdateClient> for Service<Db, Au>
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

    async fn execute(&self, cmd: UpdateClient) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateClient {
            client_id,
            kind,
            name,
            email,
            phone,
            address,
            notes,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits of the same `Client`.
        tx.execute(Lock(By::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut client = tx
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())?;

        client.kind = kind;
        client.name = name;
        client.email = email;
        client.phone = phone;
        client.address = address;
        client.notes = notes;

        tx.execute(Update(client.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(client)
    }
}

/// Error of [`UpdateClient`] [`Command`] execution.
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
