//! [`Command`] for creating a new [`Reminder`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        client, invoice, quote, reminder, Client, Invoice, Quote, Reminder,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Reminder`].
#[derive(Clone, Debug)]
pub struct CreateReminder {
    /// ID of the [`Client`] to follow up.
    pub client_id: client::Id,

    /// ID of the [`Quote`] of the [`Client`] the [`Reminder`] is about.
    pub quote_id: Option<quote::Id>,

    /// ID of the [`Invoice`] of the [`Client`] the [`Reminder`] is about.
    pub invoice_id: Option<invoice::Id>,

    /// [`reminder::Note`] describing what to do.
    pub note: reminder::Note,

    /// [`reminder::DueDate`] of a new [`Reminder`].
    pub due_on: reminder::DueDate,
}

impl<Db, Au> Command<CreateReminder> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Invoice>, invoice::Id>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Reminder>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Reminder;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateReminder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReminder {
            client_id,
            quote_id,
            invoice_id,
            note,
            due_on,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Client>, _>::new(client_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ClientNotExists(client_id))
                .map_err(tracerr::wrap!())?,
        );
        if let Some(id) = quote_id {
            let quote = self
                .database()
                .execute(Select(By::<Option<Quote>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::QuoteNotExists(id))
                .map_err(tracerr::wrap!())?;
            if quote.client_id != client_id {
                return Err(tracerr::new!(E::QuoteNotOwned(id)));
            }
        }
        if let Some(id) = invoice_id {
            let invoice = self
                .database()
                .execute(Select(By::<Option<Invoice>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::InvoiceNotExists(id))
                .map_err(tracerr::wrap!())?;
            if invoice.client_id != client_id {
                return Err(tracerr::new!(E::InvoiceNotOwned(id)));
            }
        }

        let reminder = Reminder {
            id: reminder::Id::new(),
            client_id,
            quote_id,
            invoice_id,
            note,
            due_on,
            done_at: None,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(reminder.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(reminder)
    }
}

/// Error of [`CreateReminder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Invoice`] with the provided ID does not exist.
    #[display("`Invoice(id: {_0})` does not exist")]
    #[from(ignore)]
    InvoiceNotExists(#[error(not(source))] invoice::Id),

    /// [`Invoice`] belongs to another [`Client`].
    #[display("`Invoice(id: {_0})` belongs to another `Client`")]
    #[from(ignore)]
    InvoiceNotOwned(#[error(not(source))] invoice::Id),

    /// [`Quote`] with the provided ID does not exist.
    #[display("`Quote(id: {_0})` does not exist")]
    #[from(ignore)]
    QuoteNotExists(#[error(not(source))] quote::Id),

    /// [`Quote`] belongs to another [`Client`].
    #[display("`Quote(id: {_0})` belongs to another `Client`")]
    #[from(ignore)]
    QuoteNotOwned(#[error(not(source))] quote::Id),
}
