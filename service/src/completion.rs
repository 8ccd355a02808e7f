//! [`Completions`] of asynchronously generated [`Quote`] documents.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, time};

#[cfg(doc)]
use crate::domain::Quote;
use crate::domain::{document, quote};

/// Outcome of a [`Quote`] document generation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Document has been generated and is available at the [`document::Url`].
    Completed(document::Url),

    /// Automation platform failed to generate the document.
    Failed(String),

    /// Document hasn't been generated in time.
    Pending,
}

/// Configuration of a [`Waiter::wait()`].
#[derive(Clone, Copy, Debug)]
pub struct WaitConfig {
    /// Number of intervals to wait for before giving up.
    pub attempts: u32,

    /// Interval after which the [`Quote`] row is re-read if no completion
    /// has been reported.
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(500),
        }
    }
}

/// Registry of document generations being waited for.
#[derive(Clone, Debug, Default)]
pub struct Completions {
    /// Pending generations by [`quote::Id`].
    waiters: Arc<Mutex<HashMap<quote::Id, watch::Sender<Option<Outcome>>>>>,
}

impl Completions {
    /// Registers a new [`Waiter`] for the document of the specified
    /// [`Quote`].
    ///
    /// Any [`Outcome`] reported before is discarded, as it belongs to a
    /// previous generation.
    #[must_use]
    pub fn register(&self, id: quote::Id) -> Waiter {
        let mut waiters =
            self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = waiters
            .entry(id)
            .or_insert_with(|| watch::Sender::new(None));
        drop(tx.send_replace(None));
        let rx = tx.subscribe();
        Waiter {
            id,
            rx,
            hub: self.clone(),
        }
    }

    /// Reports the [`Outcome`] of the specified [`Quote`] document
    /// generation.
    ///
    /// Returns `false` if nobody waits for it.
    pub fn complete(&self, id: quote::Id, outcome: Outcome) -> bool {
        let waiters =
            self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
        waiters.get(&id).is_some_and(|tx| {
            drop(tx.send_replace(Some(outcome)));
            true
        })
    }
}

/// Handle waiting for a [`Quote`] document generation [`Outcome`].
///
/// Unregisters itself from its [`Completions`] on drop.
#[derive(Debug)]
pub struct Waiter {
    /// ID of the [`Quote`] being waited for.
    id: quote::Id,

    /// Receiver of the reported [`Outcome`].
    rx: watch::Receiver<Option<Outcome>>,

    /// [`Completions`] this [`Waiter`] is registered in.
    hub: Completions,
}

impl Waiter {
    /// Waits for the [`Outcome`] to be reported, re-checking the [`Quote`]
    /// with the provided `poll` function after every [`WaitConfig::interval`]
    /// of silence.
    ///
    /// Returns [`Outcome::Pending`] once [`WaitConfig::attempts`] are
    /// exhausted.
    ///
    /// # Errors
    ///
    /// If the `poll` function fails.
    pub async fn wait<F, Fut, E>(
        &mut self,
        config: WaitConfig,
        mut poll: F,
    ) -> Result<Outcome, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<document::Url>, E>>,
    {
        for _ in 0..config.attempts {
            let reported = self.rx.wait_for(Option::is_some);
            let reported = match time::timeout(config.interval, reported).await
            {
                Ok(Ok(outcome)) => outcome.clone(),
                Ok(Err(_)) | Err(_) => None,
            };
            if let Some(outcome) = reported {
                return Ok(outcome);
            }

            if let Some(url) = poll().await? {
                return Ok(Outcome::Completed(url));
            }
        }
        Ok(Outcome::Pending)
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        let mut waiters = self
            .hub
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Own receiver is still alive here.
        if waiters.get(&self.id).is_some_and(|tx| tx.receiver_count() <= 1) {
            drop(waiters.remove(&self.id));
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{convert::Infallible, time::Duration};

    use tokio::time;

    use crate::domain::{document, quote};

    use super::{Completions, Outcome, WaitConfig};

    const CONFIG: WaitConfig = WaitConfig {
        attempts: 3,
        interval: Duration::from_millis(500),
    };

    fn url() -> document::Url {
        document::Url::new("https://cdn.example.com/d.pdf").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_on_reported_completion() {
        let hub = Completions::default();
        let id = quote::Id::new();
        let mut waiter = hub.register(id);

        let reporter = hub.clone();
        drop(tokio::spawn(async move {
            time::sleep(Duration::from_millis(700)).await;
            assert!(reporter.complete(id, Outcome::Completed(url())));
        }));

        let outcome = waiter
            .wait(CONFIG, || async { Ok::<_, Infallible>(None) })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Completed(url()));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_failure() {
        let hub = Completions::default();
        let id = quote::Id::new();
        let mut waiter = hub.register(id);

        assert!(hub.complete(id, Outcome::Failed("no template".into())));

        let outcome = waiter
            .wait(CONFIG, || async { Ok::<_, Infallible>(None) })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failed("no template".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn falls_back_to_polling() {
        let hub = Completions::default();
        let mut waiter = hub.register(quote::Id::new());

        let mut polls = 0;
        let outcome = waiter
            .wait(CONFIG, || {
                polls += 1;
                let found = (polls == 2).then(url);
                async move { Ok::<_, Infallible>(found) }
            })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Completed(url()));
        assert_eq!(polls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_attempts() {
        let hub = Completions::default();
        let mut waiter = hub.register(quote::Id::new());

        let started = time::Instant::now();
        let outcome = waiter
            .wait(CONFIG, || async { Ok::<_, Infallible>(None) })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Pending);
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn new_generation_ignores_previous_outcome() {
        let hub = Completions::default();
        let id = quote::Id::new();

        let _previous = hub.register(id);
        assert!(hub.complete(id, Outcome::Failed("no template".into())));

        let mut waiter = hub.register(id);
        let outcome = waiter
            .wait(CONFIG, || async { Ok::<_, Infallible>(None) })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Pending);
    }

    #[test]
    fn unregisters_on_drop() {
        let hub = Completions::default();
        let id = quote::Id::new();

        let first = hub.register(id);
        let second = hub.register(id);
        drop(first);
        assert!(hub.complete(id, Outcome::Pending));

        drop(second);
        assert!(!hub.complete(id, Outcome::Pending));
    }
}
