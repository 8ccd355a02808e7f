//! [`Command`] for updating an [`Invoice`].

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        catalog, document, invoice, totals::Discount, CatalogItem, Invoice,
    },
    infra::{database, Database},
    Service,
};

use super::{
    line_draft::{self, LineDraft},
    Command,
};

/// [`Command`] for updating the contents of an [`Invoice`].
///
/// Lines, discount, comments and due date are replaced as a whole. A paid
/// [`Invoice`] can't be updated.
#[derive(Clone, Debug)]
pub struct UpdateInvoice {
    /// ID of the [`Invoice`] to be updated.
    pub invoice_id: invoice::Id,

    /// New [`LineDraft`]s of the [`Invoice`].
    pub lines: Vec<LineDraft>,

    /// New [`Discount`] of the [`Invoice`].
    pub discount: Option<Discount>,

    /// New [`document::Comments`] of the [`Invoice`].
    pub comments: Option<document::Comments>,

    /// New [`invoice::DueDate`] of the [`Invoice`].
    pub due_on: invoice::DueDate,
}

impl<Db, Au> Command<UpdateInvoice> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Invoice>, invoice::Id>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<HashMap<catalog::Id, CatalogItem>, Vec<catalog::Id>>,
            >,
            Ok = HashMap<catalog::Id, CatalogItem>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Invoice, invoice::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Invoice>, invoice::Id>>,
            Ok = Option<Invoice>,
            Err = Traced<database::Error>,
        > + Database<Update<Invoice>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateInvoice) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateInvoice {
            invoice_id,
            lines,
            discount,
            comments,
            due_on,
        } = cmd;

        let currency = self
            .database()
            .execute(Select(By::<Option<Invoice>, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvoiceNotExists(invoice_id))
            .map_err(tracerr::wrap!())?
            .currency;
        let lines =
            line_draft::resolve::<_, E>(self.database(), lines, currency)
                .await
                .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits of the same `Invoice`.
        tx.execute(Lock(By::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut invoice = tx
            .execute(Select(By::<Option<Invoice>, _>::new(invoice_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvoiceNotExists(invoice_id))
            .map_err(tracerr::wrap!())?;
        if invoice.payment.is_some() {
            return Err(tracerr::new!(E::InvoicePaid(invoice_id)));
        }

        invoice.lines = lines;
        invoice.discount = discount;
        invoice.comments = comments;
        invoice.due_on = due_on;
        invoice.updated_at = DateTime::now().coerce();
        if invoice.totals().discount_exceeds_subtotal() {
            log::warn!(
                "`Invoice({})` discount exceeds its subtotal",
                invoice.number,
            );
        }

        tx.execute(Update(invoice.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(invoice)
    }
}

/// Error of [`UpdateInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Invoice`] is paid already.
    #[display("`Invoice(id: {_0})` is paid already")]
    #[from(ignore)]
    InvoicePaid(#[error(not(source))] invoice::Id),

    /// [`Invoice`] with the provided ID does not exist.
    #[display("`Invoice(id: {_0})` does not exist")]
    #[from(ignore)]
    InvoiceNotExists(#[error(not(source))] invoice::Id),

    /// [`LineDraft`] cannot be resolved.
    #[display("Invalid line: {_0}")]
    Line(line_draft::Error),
}
