//! [`Command`] for generating the PDF document of a [`Quote`].

use common::operations::{By, Perform, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::document;
use crate::{
    completion::Outcome,
    domain::{client, quote, vehicle, Client, Quote, Vehicle},
    infra::{automation, database, Automation, Database},
    Service,
};

use super::Command;

/// [`Command`] for generating the PDF document of a [`Quote`].
///
/// Asks the automation platform to render the document and waits, within
/// bounds, for it to report back, either by a callback completing the
/// [`Quote`] or by writing its [`document::Url`] directly.
#[derive(Clone, Copy, Debug)]
pub struct GenerateQuoteDocument {
    /// ID of the [`Quote`] to generate the document of.
    pub quote_id: quote::Id,
}

impl<Db, Au> Command<GenerateQuoteDocument> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        >,
    Au: Automation<
        Perform<automation::GenerateDocument>,
        Ok = (),
        Err = Traced<automation::Error>,
    >,
{
    type Ok = Outcome;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: GenerateQuoteDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateQuoteDocument { quote_id } = cmd;

        let quote = self
            .database()
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;
        let client = self
            .database()
            .execute(Select(By::<Option<Client>, _>::new(quote.client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(quote.client_id))
            .map_err(tracerr::wrap!())?;
        let vehicle = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(quote.vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(quote.vehicle_id))
            .map_err(tracerr::wrap!())?;

        // Register before the call, so a quick callback isn't missed.
        let mut waiter = self.completions().register(quote_id);
        let previous_url = quote.document_url.clone();

        self.automation()
            .execute(Perform(automation::GenerateDocument {
                quote,
                client,
                vehicle,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let (db, previous_url) = (self.database(), previous_url.as_ref());
        let outcome = waiter
            .wait(self.config().document_wait, || async move {
                db.execute(Select(By::<Option<Quote>, _>::new(quote_id)))
                    .await
                    .map(|q| {
                        q.and_then(|q| q.document_url)
                            .filter(|url| previous_url != Some(url))
                    })
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if outcome == Outcome::Pending {
            log::warn!("`Quote(id: {quote_id})` document is still pending");
        }

        Ok(outcome)
    }
}

/// Error of [`GenerateQuoteDocument`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Automation`] platform failed to accept the request.
    #[display("`Automation` operation failed: {_0}")]
    Automation(automation::Error),

    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Quote`] with the provided ID does not exist.
    #[display("`Quote(id: {_0})` does not exist")]
    #[from(ignore)]
    QuoteNotExists(#[error(not(source))] quote::Id),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    #[from(ignore)]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}

#[cfg(all(test, feature = "postgres"))]
mod spec {
    use std::time::Duration;

    use tokio::time;

    use crate::{
        completion::Outcome,
        domain::quote::{self, Status},
        infra::memory::{self, Memory, Recorder},
        Command as _,
    };

    use super::GenerateQuoteDocument;

    fn documented_quote() -> (Memory, quote::Id) {
        let db = Memory::default();
        let client_id = db.add_client(memory::client(None));
        let vehicle_id = db.add_vehicle(memory::vehicle(client_id));
        let mut quote =
            memory::quote(client_id, vehicle_id, Status::Generated);
        quote.document_url = Some(memory::pdf("previous"));
        let id = db.add_quote(quote);
        (db, id)
    }

    #[tokio::test(start_paused = true)]
    async fn stays_pending_while_document_is_unchanged() {
        let (db, id) = documented_quote();
        let automation = Recorder::default();
        let service = memory::service(db, automation.clone());

        let outcome = service
            .execute(GenerateQuoteDocument { quote_id: id })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Pending);
        assert_eq!(*automation.generations.lock().unwrap(), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn completes_once_new_document_is_stored() {
        let (db, id) = documented_quote();
        let service = memory::service(db.clone(), Recorder::default());

        drop(tokio::spawn(async move {
            time::sleep(Duration::from_millis(150)).await;
            let mut state = db.state();
            if let Some(q) = state.quotes.get_mut(&id) {
                q.document_url = Some(memory::pdf("fresh"));
            }
        }));

        let outcome = service
            .execute(GenerateQuoteDocument { quote_id: id })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Completed(memory::pdf("fresh")));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_reported_failure() {
        let (db, id) = documented_quote();
        let service = memory::service(db, Recorder::default());

        let hub = service.completions().clone();
        drop(tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            assert!(hub.complete(id, Outcome::Failed("no template".into())));
        }));

        let outcome = service
            .execute(GenerateQuoteDocument { quote_id: id })
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed("no template".into()));
    }
}
