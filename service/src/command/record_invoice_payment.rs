//! [`Command`] for recording a [`Payment`] of an [`Invoice`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        invoice::{self, Payment},
        Invoice,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a [`Payment`] of an [`Invoice`].
///
/// An [`Invoice`] is paid only once.
#[derive(Clone, Copy, Debug)]
pub struct RecordInvoicePayment {
    /// ID of the paid [`Invoice`].
    pub invoice_id: invoice::Id,

    /// [`invoice::PaymentMethod`] the [`Invoice`] is paid with.
    pub method: invoice::PaymentMethod,

    /// [`invoice::PaymentDate`], if not today.
    pub paid_on: Option<invoice::PaymentDate>,
}

impl<Db, Au> Command<RecordInvoicePayment> for Service<Db, Au>
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
        > + Database<Update<Invoice>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecordInvoicePayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordInvoicePayment {
            invoice_id,
            method,
            paid_on,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid recording concurrent payments.
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

        invoice.payment = Some(Payment {
            method,
            paid_on: paid_on.unwrap_or_else(|| Date::today().coerce()),
        });
        invoice.updated_at = DateTime::now().coerce();

        tx.execute(Update(invoice.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(invoice)
    }
}

/// Error of [`RecordInvoicePayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Invoice`] with the provided ID does not exist.
    #[display("`Invoice(id: {_0})` does not exist")]
    #[from(ignore)]
    InvoiceNotExists(#[error(not(source))] invoice::Id),

    /// [`Invoice`] is paid already.
    #[display("`Invoice(id: {_0})` is paid already")]
    #[from(ignore)]
    InvoicePaid(#[error(not(source))] invoice::Id),
}

#[cfg(all(test, feature = "postgres"))]
mod spec {
    use crate::{
        domain::invoice::{self, PaymentMethod},
        infra::memory::{self, Memory, Recorder},
        Command as _,
    };

    use super::{ExecutionError, RecordInvoicePayment};

    fn paying(
        invoice_id: invoice::Id,
        method: PaymentMethod,
    ) -> RecordInvoicePayment {
        RecordInvoicePayment {
            invoice_id,
            method,
            paid_on: None,
        }
    }

    #[tokio::test]
    async fn refuses_second_payment() {
        let db = Memory::default();
        let client_id = db.add_client(memory::client(None));
        let id = db.add_invoice(memory::invoice(client_id));
        let service = memory::service(db.clone(), Recorder::default());

        let paid = service
            .execute(paying(id, PaymentMethod::Card))
            .await
            .unwrap();
        assert_eq!(paid.payment.map(|p| p.method), Some(PaymentMethod::Card));

        let err = service
            .execute(paying(id, PaymentMethod::Cash))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvoicePaid(_)));

        let stored = db.state().invoices.get(&id).cloned().unwrap();
        assert_eq!(
            stored.payment.map(|p| p.method),
            Some(PaymentMethod::Card),
        );
    }

    #[tokio::test]
    async fn fails_on_unknown_invoice() {
        let service = memory::service(Memory::default(), Recorder::default());

        let err = service
            .execute(paying(invoice::Id::new(), PaymentMethod::Check))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvoiceNotExists(_)));
    }
}
