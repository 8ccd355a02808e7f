//! [`Command`] for creating a new [`Quote`].

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    Currency, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        catalog, client, document, quote, totals::Discount, vehicle,
        CatalogItem, Client, Quote, Vehicle,
    },
    infra::{database, Database},
    Service,
};

use super::{
    line_draft::{self, LineDraft},
    Command,
};

/// [`Command`] for creating a new [`Quote`] in [`quote::Status::Draft`].
#[derive(Clone, Debug)]
pub struct CreateQuote {
    /// ID of the [`Client`] a new [`Quote`] is addressed to.
    pub client_id: client::Id,

    /// ID of the [`Vehicle`] a new [`Quote`] is about.
    pub vehicle_id: vehicle::Id,

    /// [`LineDraft`]s of a new [`Quote`].
    pub lines: Vec<LineDraft>,

    /// [`Discount`] of a new [`Quote`].
    pub discount: Option<Discount>,

    /// [`Currency`] of a new [`Quote`], if not the default one.
    pub currency: Option<Currency>,

    /// [`document::Comments`] of a new [`Quote`].
    pub comments: Option<document::Comments>,

    /// [`quote::ValidityDate`] of a new [`Quote`].
    pub valid_until: Option<quote::ValidityDate>,
}

impl<Db, Au> Command<CreateQuote> for Service<Db, Au>
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
            Select<By<quote::Number, quote::CreationDateTime>>,
            Ok = quote::Number,
            Err = Traced<database::Error>,
        > + Database<Insert<Quote>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateQuote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateQuote {
            client_id,
            vehicle_id,
            lines,
            discount,
            currency,
            comments,
            valid_until,
        } = cmd;

        self.database()
            .execute(Select(By::<Option<Client>, _>::new(client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(client_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;
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
            .execute(Select(By::<quote::Number, _>::new(now.coerce())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let quote = Quote {
            id: quote::Id::new(),
            number,
            client_id,
            vehicle_id,
            lines,
            discount,
            currency,
            status: quote::Status::Draft,
            document_url: None,
            comments,
            valid_until,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: None,
        };
        if quote.totals().discount_exceeds_subtotal() {
            log::warn!(
                "`Quote({})` discount exceeds its subtotal",
                quote.number,
            );
        }

        tx.execute(Insert(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(quote)
    }
}

/// Error of [`CreateQuote`] [`Command`] execution.
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
