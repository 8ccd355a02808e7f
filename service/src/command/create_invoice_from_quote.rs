//! [`Command`] for billing an accepted [`Quote`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{invoice, quote, Invoice, Quote},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Invoice`] out of an accepted [`Quote`],
/// copying its lines, discount and currency.
#[derive(Clone, Copy, Debug)]
pub struct CreateInvoiceFromQuote {
    /// ID of the [`Quote`] to be billed.
    pub quote_id: quote::Id,

    /// [`invoice::DueDate`] of a new [`Invoice`], if not the default one.
    pub due_on: Option<invoice::DueDate>,
}

impl<Db, Au> Command<CreateInvoiceFromQuote> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Quote, quote::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<invoice::Number, invoice::CreationDateTime>>,
            Ok = invoice::Number,
            Err = Traced<database::Error>,
        > + Database<Insert<Invoice>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateInvoiceFromQuote,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateInvoiceFromQuote { quote_id, due_on } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Keep the `Quote` accepted while billing it.
        tx.execute(Lock(By::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let quote = tx
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;
        if quote.status != quote::Status::Accepted {
            return Err(tracerr::new!(E::QuoteNotAccepted(quote_id)));
        }

        let number = tx
            .execute(Select(By::<invoice::Number, _>::new(
                DateTime::now().coerce(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let due_on = due_on.unwrap_or_else(|| {
            Date::today()
                .plus_days(Invoice::DEFAULT_TERM_DAYS)
                .coerce()
        });
        let invoice = Invoice::from_quote(&quote, number, due_on);

        tx.execute(Insert(invoice.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(invoice)
    }
}

/// Error of [`CreateInvoiceFromQuote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Quote`] is not in [`quote::Status::Accepted`].
    #[display("`Quote(id: {_0})` is not accepted")]
    #[from(ignore)]
    QuoteNotAccepted(#[error(not(source))] quote::Id),

    /// [`Quote`] with the provided ID does not exist.
    #[display("`Quote(id: {_0})` does not exist")]
    #[from(ignore)]
    QuoteNotExists(#[error(not(source))] quote::Id),
}

#[cfg(all(test, feature = "postgres"))]
mod spec {
    use crate::{
        domain::quote::{self, Status},
        infra::memory::{self, Memory, Recorder},
        Command as _,
    };

    use super::{CreateInvoiceFromQuote, ExecutionError};

    fn billing(quote_id: quote::Id) -> CreateInvoiceFromQuote {
        CreateInvoiceFromQuote {
            quote_id,
            due_on: None,
        }
    }

    #[tokio::test]
    async fn bills_only_accepted_quotes() {
        let db = Memory::default();
        let client_id = db.add_client(memory::client(None));
        let vehicle_id = db.add_vehicle(memory::vehicle(client_id));
        let service = memory::service(db.clone(), Recorder::default());

        for &status in Status::ALL {
            if status == Status::Accepted {
                continue;
            }
            let id = db.add_quote(memory::quote(client_id, vehicle_id, status));

            let err = service.execute(billing(id)).await.unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::QuoteNotAccepted(_)),
                "`{status}` quote is billed",
            );
        }
        assert!(db.state().invoices.is_empty());

        let id = db.add_quote(memory::quote(
            client_id,
            vehicle_id,
            Status::Accepted,
        ));
        let invoice = service.execute(billing(id)).await.unwrap();

        assert_eq!(invoice.quote_id, Some(id));
        assert_eq!(invoice.client_id, client_id);
        assert_eq!(invoice.vehicle_id, Some(vehicle_id));
        assert!(invoice.payment.is_none());
        assert_eq!(db.state().invoices.len(), 1);
    }

    #[tokio::test]
    async fn fails_on_unknown_quote() {
        let service = memory::service(Memory::default(), Recorder::default());

        let err = service.execute(billing(quote::Id::new())).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::QuoteNotExists(_)));
    }
}
