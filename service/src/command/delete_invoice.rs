//! [`Command`] for deleting an [`Invoice`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Reminder;
use crate::{
    domain::{invoice, Invoice},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting an [`Invoice`].
///
/// Its [`Reminder`]s are deleted along.
#[derive(Clone, Copy, Debug)]
pub struct DeleteInvoice {
    /// ID of the [`Invoice`] to be deleted.
    pub invoice_id: invoice::Id,
}

impl<Db, Au> Command<DeleteInvoice> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Invoice, invoice::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Invoice>, invoice::Id>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Invoice, invoice::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteInvoice) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteInvoice { invoice_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let invoice = tx
            .execute(Select(By::<Option<Invoice>, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvoiceNotExists(invoice_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(invoice)
    }
}

/// Error of [`DeleteInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Invoice`] with the provided ID does not exist.
    #[display("`Invoice(id: {_0})` does not exist")]
    #[from(ignore)]
    InvoiceNotExists(#[error(not(source))] invoice::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
