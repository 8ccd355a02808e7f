//! [`Command`] for creating a new [`Client`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::client::{Address, Email, Kind, Name, Notes, Phone};
use crate::{
    domain::{client, Client},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Client`].
#[derive(Clone, Debug)]
pub struct CreateClient {
    /// [`Kind`] of a new [`Client`].
    pub kind: client::Kind,

    /// [`Name`] of a new [`Client`].
    pub name: client::Name,

    /// [`Email`] of a new [`Client`].
    pub email: Option<client::Email>,

    /// [`Phone`] of a new [`Client`].
    pub phone: Option<client::Phone>,

    /// [`Address`] of a new [`Client`].
    pub address: Option<client::Address>,

    /// [`Notes`] about a new [`Client`].
    pub notes: Option<client::Notes>,
}

impl<Db, Au> Command<CreateClient> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Client>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Client;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateClient) -> Result<Self::Ok, Self::Err> {
        let CreateClient {
            kind,
            name,
            email,
            phone,
            address,
            notes,
        } = cmd;

        let client = Client {
            id: client::Id::new(),
            kind,
            name,
            email,
            phone,
            address,
            notes,
            status: client::Status::Active,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(client.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(client)
    }
}

/// Error of [`CreateClient`] [`Command`] execution.
pub type ExecutionError = database::Error;
