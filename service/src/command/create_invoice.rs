//! [`Command`] for creating a new [`Invoice`] from explicit lines.

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Currency, Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        catalog, client, document, invoice, totals::Discount, vehicle,
        CatalogItem, Client, Invoice, Vehicle,
    },
    infra::{database, Database},
    Service,
};

use super::{
    line_draft::{self, LineDraft},
    Command,
};

/// [`Command`] for creating a new unpaid [`Invoice`].
#[derive(Clone, Debug)]
pub struct CreateInvoice {
    /// ID of the [`Client`] a new [`Invoice`] is addressed to.
    pub client_id: client::Id,

    /// ID of the [`Vehicle`] a new [`Invoice`] is about, if any.
    pub vehicle_id: Option<vehicle::Id>,

    /// [`LineDraft`]s of a new [`Invoice`].
    pub lines: Vec<LineDraft>,

    /// [`Discount`] of a new [`Invoice`].
    pub discount: Option<Discount>,

    /// [`Currency`] of a new [`Invoice`], if not the default one.
    pub currency: Option<Currency>,

    /// [`invoice::DueDate`] of a new [`Invoice`], if not the default one.
    pub due_on: Option<invoice::DueDate>,

    /// [`document::Comments`] of a new [`Invoice`].
    pub comments: Option<document::Comments>,
}

impl<Db, Au> Command<CreateInvoice> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<HashMap<catalog::Id, CatalogItem>, Vec<catalog::Id>>,
            >,
            Ok = HashMap<catalog::Id, CatalogItem>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<invoice::Number, invoice::CreationDateTime>>,
            Ok = invoice::Number,
            Err = Traced<database::Error>,
        > + Database<Insert<Invoice>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Invoice;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateInvoice) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateInvoice {
            client_id,
            vehicle_id,
            lines,
            discount,
            currency,
            due_on,
            comments,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;
        if let Some(vehicle_id) = vehicle_id {
            let vehicle = self
                .database()
                .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::VehicleNotExists(vehicle_id))
                .map_err(tracerr::wrap!())?;
            if vehicle.client_id != client_id {
                return Err(tracerr::new!(E::VehicleNotOwned(vehicle_id)));
            }
        }

        let currency = currency.unwrap_or(self.config().currency);
        let lines =
            line_draft::resolve::<_, E>(self.database(), lines, currency)
                .await
                .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let number = tx
            .execute(Select(By::<invoice::Number, _>::new(now.coerce())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let invoice = Invoice {
            id: invoice::Id::new(),
            number,
            client_id,
            vehicle_id,
            quote_id: None,
            lines,
            discount,
            currency,
            due_on: due_on.unwrap_or_else(|| {
                Date::today()
                    .plus_days(Invoice::DEFAULT_TERM_DAYS)
                    .coerce()
            }),
            payment: None,
            document_url: None,
            comments,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };
        if invoice.totals().discount_exceeds_subtotal() {
            log::warn!(
                "`Invoice({})` discount exceeds its subtotal",
                invoice.number,
            );
        }

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

/// Error of [`CreateInvoice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`LineDraft`] cannot be resolved.
    #[display("Invalid line: {_0}")]
    Line(line_draft::Error),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] doesn't belong to the [`Client`].
    #[display("`Vehicle(id: {_0})` belongs to another `Client`")]
    #[from(ignore)]
    VehicleNotOwned(#[error(not(source))] vehicle::Id),
}
