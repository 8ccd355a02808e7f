//! [`FollowUpQuotes`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{
        By, Commit, Insert, Lock, Perform, Select, Start, Transact,
        Transacted, Update,
    },
    Date, DateTime,
};
use derive_more::{Display, Error as StdError, From};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::quote::Status;
use crate::{
    domain::{quote, reminder, Quote, Reminder},
    infra::{database, Database},
    read, Service,
};

use super::Task;

/// Configuration for [`FollowUpQuotes`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between checks of the sent [`Quote`]s.
    pub interval: time::Duration,

    /// Time after which a sent [`Quote`] without an answer should be followed
    /// up.
    pub follow_up_after: time::Duration,
}

/// [`Task`] moving unanswered [`Status::Sent`] [`Quote`]s to
/// [`Status::ToFollowUp`] and creating a [`Reminder`] for each of them.
///
/// A [`Quote`] failing to be moved is logged and retried on the next run.
#[derive(Clone, Copy, Debug)]
pub struct FollowUpQuotes<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Au> Task<Start<By<FollowUpQuotes<Self>, Config>>> for Service<Db, Au>
where
    FollowUpQuotes<Service<Db, Au>>:
        Task<Perform<()>, Ok = usize, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<FollowUpQuotes<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = FollowUpQuotes {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::info!("{n} `Quote`s moved to follow-up"),
                Err(e) => log::error!("`task::FollowUpQuotes` failed: {e}"),
            }
        }
    }
}

impl<Db, Au> Task<Perform<()>> for FollowUpQuotes<Service<Db, Au>>
where
    Db: Database<
            Select<By<Vec<Quote>, read::quote::SentBefore>>,
            Ok = Vec<Quote>,
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
        + Database<Insert<Reminder>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let deadline = DateTime::now() - self.config.follow_up_after;
        let stale = self
            .service
            .database()
            .execute(Select(By::new(read::quote::SentBefore(
                deadline.coerce(),
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut moved = 0;
        for q in stale {
            let followed_up = async {
                let tx = self
                    .service
                    .database()
                    .execute(Transact)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                // Avoid racing with a manual status change.
                tx.execute(Lock(By::new(q.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                let Some(mut quote) = tx
                    .execute(Select(By::<Option<Quote>, _>::new(q.id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .filter(|q| q.status == quote::Status::Sent)
                else {
                    return Ok(false);
                };

                _ = quote.set_status(quote::Status::ToFollowUp);
                tx.execute(Update(quote.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                tx.execute(Insert(reminder_for(&quote)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                tx.execute(Commit)
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;

                Ok::<_, Traced<ExecutionError>>(true)
            }
            .await;

            match followed_up {
                Ok(true) => moved += 1,
                Ok(false) => {}
                Err(e) => log::error!(
                    "failed to follow up `Quote({})`: {e}",
                    q.number,
                ),
            }
        }
        Ok(moved)
    }
}

/// Creates a new [`Reminder`] due today to follow up the provided [`Quote`].
fn reminder_for(quote: &Quote) -> Reminder {
    // SAFETY: The formatted note is single-line and well under the length
    //         limit.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    let note = unsafe {
        reminder::Note::new_unchecked(format!(
            "Relancer le client pour le devis {}",
            quote.number,
        ))
    };

    Reminder {
        id: reminder::Id::new(),
        client_id: quote.client_id,
        quote_id: Some(quote.id),
        invoice_id: None,
        note,
        due_on: Date::today().coerce(),
        done_at: None,
        created_at: DateTime::now().coerce(),
    }
}

/// Error of [`FollowUpQuotes`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime};

    use crate::domain::{client, quote, vehicle, Quote};

    use super::reminder_for;

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn keeps_following_up_after_a_failure() {
        use std::time::Duration;

        use common::operations::Perform;

        use crate::{
            infra::memory::{self, Memory, Recorder},
            Task as _,
        };

        use super::FollowUpQuotes;

        let db = Memory::default();
        let client_id = db.add_client(memory::client(None));
        let vehicle_id = db.add_vehicle(memory::vehicle(client_id));
        let month_ago = DateTime::now() - Duration::from_secs(30 * 24 * 3600);
        let stale = || {
            let mut quote =
                memory::quote(client_id, vehicle_id, quote::Status::Sent);
            quote.sent_at = Some(month_ago.coerce());
            db.add_quote(quote)
        };
        let broken = stale();
        let healthy = stale();
        let recent = db.add_quote(memory::quote(
            client_id,
            vehicle_id,
            quote::Status::Sent,
        ));
        let _ = db.state().broken_quotes.insert(broken);

        let service = memory::service(db.clone(), Recorder::default());
        let task = FollowUpQuotes {
            config: service.config().follow_up_quotes,
            service,
        };
        let moved = task.execute(Perform(())).await.unwrap();

        assert_eq!(moved, 1);
        let status = |id| db.quote(id).map(|q| q.status);
        assert_eq!(status(healthy), Some(quote::Status::ToFollowUp));
        assert_eq!(status(broken), Some(quote::Status::Sent));
        assert_eq!(status(recent), Some(quote::Status::Sent));

        let state = db.state();
        assert_eq!(state.reminders.len(), 1);
        assert_eq!(state.reminders[0].quote_id, Some(healthy));
    }

    #[test]
    fn reminds_about_quote_today() {
        let now = DateTime::now();
        let quote = Quote {
            id: quote::Id::new(),
            number: quote::Number::new(2024, 12),
            client_id: client::Id::new(),
            vehicle_id: vehicle::Id::new(),
            lines: vec![],
            discount: None,
            currency: Currency::Eur,
            status: quote::Status::ToFollowUp,
            document_url: None,
            comments: None,
            valid_until: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: Some(now.coerce()),
        };

        let r = reminder_for(&quote);
        assert_eq!(r.client_id, quote.client_id);
        assert_eq!(r.quote_id, Some(quote.id));
        assert_eq!(
            r.note.to_string(),
            "Relancer le client pour le devis D-2024-00012",
        );
        assert_eq!(r.due_on, common::Date::today().coerce());
        assert!(!r.is_done());
    }
}
