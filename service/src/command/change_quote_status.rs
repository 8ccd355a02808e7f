//! [`Command`] for moving a [`Quote`] across the kanban board.

use common::operations::{
    By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{client, quote, Client, Quote},
    infra::{automation, database, Automation, Database},
    Service,
};

use super::{send_quote::default_email, Command};

/// [`Command`] for moving a [`Quote`] into another [`quote::Status`].
///
/// Any [`quote::Status`] may be changed to any other one. Moving a [`Quote`]
/// into [`quote::Status::Sent`] emails its document to the [`Client`].
#[derive(Clone, Copy, Debug)]
pub struct ChangeQuoteStatus {
    /// ID of the [`Quote`] to be moved.
    pub quote_id: quote::Id,

    /// New [`quote::Status`] of the [`Quote`].
    pub status: quote::Status,
}

/// Outcome of notifying a [`Client`] about a sent [`Quote`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
    /// [`Quote`] hasn't been moved into [`quote::Status::Sent`].
    NotRequired,

    /// Email has been handed over to the automation platform.
    Sent,

    /// Email couldn't be sent, while the [`quote::Status`] change is kept.
    Failed(String),
}

/// Output of [`ChangeQuoteStatus`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Moved [`Quote`].
    pub quote: Quote,

    /// [`Notification`] of the [`Client`].
    pub notification: Notification,
}

impl<Db, Au> Command<ChangeQuoteStatus> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Quote, quote::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<Update<Quote>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Au: Automation<
        Perform<automation::SendEmail>,
        Ok = (),
        Err = Traced<automation::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ChangeQuoteStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ChangeQuoteStatus { quote_id, status } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent moves of the same `Quote`.
        tx.execute(Lock(By::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut quote = tx
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;

        let previous = quote.set_status(status);
        if previous == status {
            return Ok(Output {
                quote,
                notification: Notification::NotRequired,
            });
        }

        tx.execute(Update(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let notification = if status == quote::Status::Sent {
            match self.notify(&quote).await {
                Ok(()) => Notification::Sent,
                Err(reason) => {
                    log::warn!(
                        "`Quote({})` is sent, but its `Client` is not \
                         notified: {reason}",
                        quote.number,
                    );
                    Notification::Failed(reason)
                }
            }
        } else {
            Notification::NotRequired
        };

        Ok(Output {
            quote,
            notification,
        })
    }
}

impl<Db, Au> Service<Db, Au>
where
    Db: Database<
        Select<By<Option<Client>, client::Id>>,
        Ok = Option<Client>,
        Err = Traced<database::Error>,
    >,
    Au: Automation<
        Perform<automation::SendEmail>,
        Ok = (),
        Err = Traced<automation::Error>,
    >,
{
    /// Emails the document of the provided [`Quote`] to its [`Client`],
    /// returning the reason of a failure, if any.
    async fn notify(&self, quote: &Quote) -> Result<(), String> {
        let document_url = quote
            .document_url
            .clone()
            .ok_or("document is not generated")?;
        let client = self
            .database()
            .execute(Select(By::<Option<Client>, _>::new(quote.client_id)))
            .await
            .map_err(|e| e.to_string())?
            .ok_or("`Client` does not exist")?;
        let email = client.email.clone().ok_or("`Client` has no email")?;

        let (subject, body) = default_email(quote, &client);
        self.automation()
            .execute(Perform(automation::SendEmail {
                quote_id: quote.id,
                email,
                document_url,
                subject,
                body,
            }))
            .await
            .map_err(|e| e.to_string())
    }
}

/// Error of [`ChangeQuoteStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

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

    use super::{ChangeQuoteStatus, ExecutionError, Notification};

    fn generated_quote(email: Option<&str>) -> (Memory, quote::Id) {
        let db = Memory::default();
        let client_id = db.add_client(memory::client(email));
        let vehicle_id = db.add_vehicle(memory::vehicle(client_id));
        let mut quote =
            memory::quote(client_id, vehicle_id, Status::Generated);
        quote.document_url = Some(memory::pdf("devis"));
        let id = db.add_quote(quote);
        (db, id)
    }

    fn moving(quote_id: quote::Id, status: Status) -> ChangeQuoteStatus {
        ChangeQuoteStatus { quote_id, status }
    }

    #[tokio::test]
    async fn emails_only_when_moved_into_sent() {
        let (db, id) = generated_quote(Some("client@example.com"));
        let automation = Recorder::default();
        let service = memory::service(db.clone(), automation.clone());

        let out = service.execute(moving(id, Status::Sent)).await.unwrap();
        assert_eq!(out.notification, Notification::Sent);
        assert_eq!(automation.emails_sent(), 1);
        assert!(db.quote(id).unwrap().sent_at.is_some());

        let out = service.execute(moving(id, Status::Sent)).await.unwrap();
        assert_eq!(out.notification, Notification::NotRequired);
        assert_eq!(automation.emails_sent(), 1);

        let out =
            service.execute(moving(id, Status::Accepted)).await.unwrap();
        assert_eq!(out.notification, Notification::NotRequired);
        assert_eq!(automation.emails_sent(), 1);
        assert_eq!(db.quote(id).unwrap().status, Status::Accepted);
    }

    #[tokio::test]
    async fn moves_between_any_statuses() {
        let (db, id) = generated_quote(None);
        let service = memory::service(db.clone(), Recorder::default());

        for status in [Status::Refused, Status::Draft, Status::ToFollowUp] {
            let out = service.execute(moving(id, status)).await.unwrap();
            assert_eq!(out.quote.status, status);
            assert_eq!(db.quote(id).unwrap().status, status);
        }
    }

    #[tokio::test]
    async fn keeps_status_when_notification_fails() {
        let (db, id) = generated_quote(Some("client@example.com"));
        let automation = Recorder {
            email_fails: true,
            ..Recorder::default()
        };
        let service = memory::service(db.clone(), automation.clone());

        let out = service.execute(moving(id, Status::Sent)).await.unwrap();
        assert!(matches!(
            out.notification,
            Notification::Failed(r) if r.contains("502"),
        ));
        assert_eq!(automation.emails_sent(), 0);
        assert_eq!(db.quote(id).unwrap().status, Status::Sent);
    }

    #[tokio::test]
    async fn reports_client_without_email() {
        let (db, id) = generated_quote(None);
        let automation = Recorder::default();
        let service = memory::service(db.clone(), automation.clone());

        let out = service.execute(moving(id, Status::Sent)).await.unwrap();
        assert_eq!(
            out.notification,
            Notification::Failed("`Client` has no email".into()),
        );
        assert_eq!(automation.emails_sent(), 0);
        assert_eq!(db.quote(id).unwrap().status, Status::Sent);
    }

    #[tokio::test]
    async fn fails_on_unknown_quote() {
        let service = memory::service(Memory::default(), Recorder::default());

        let err = service
            .execute(moving(quote::Id::new(), Status::Sent))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::QuoteNotExists(_)));
    }
}
