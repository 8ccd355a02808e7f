//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod completion;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::{
    operations::{By, Start},
    Currency,
};
use derive_more::{Debug, Display, Error};

#[cfg(doc)]
use infra::{Automation, Database};

pub use self::{
    command::Command, completion::Completions, query::Query, task::Task,
};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Currency`] new documents are priced in by default.
    pub currency: Currency,

    /// Bounds of waiting for a generated document.
    pub document_wait: completion::WaitConfig,

    /// [`task::FollowUpQuotes`] configuration.
    pub follow_up_quotes: task::follow_up_quotes::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Au> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Automation`] platform of this [`Service`].
    automation: Au,

    /// Document generations being waited for.
    completions: Completions,
}

impl<Db, Au> Service<Db, Au> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        automation: Au,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::FollowUpQuotes<Self>,
                        task::follow_up_quotes::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            automation,
            completions: Completions::default(),
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().follow_up_quotes)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Automation`] platform of this [`Service`].
    #[must_use]
    pub fn automation(&self) -> &Au {
        &self.automation
    }

    /// Returns [`Completions`] of this [`Service`].
    #[must_use]
    pub fn completions(&self) -> &Completions {
        &self.completions
    }
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
        Start<
            By<task::FollowUpQuotes<Svc>, task::follow_up_quotes::Config>,
        >,
    >,
{
    /// [`task::FollowUpQuotes`] failed to start.
    FollowUpQuotesTask(
        TaskStartError<
            Svc,
            task::FollowUpQuotes<Svc>,
            task::follow_up_quotes::Config,
        >,
    ),
}
