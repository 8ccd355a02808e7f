//! [`Automation`] platform integration.
//!
//! PDF generation and email dispatch are delegated to an external no-code
//! automation platform, reached through outbound webhooks.

#[cfg(feature = "webhooks")]
pub mod webhooks;

use derive_more::{Display, Error as StdError, From};

use crate::domain::{
    document::{self, Body, Subject},
    quote,
    user::Email,
    Client, Quote, Vehicle,
};

#[cfg(feature = "webhooks")]
pub use self::webhooks::Webhooks;

/// Automation platform operation.
pub use common::Handler as Automation;

/// Request to generate the PDF document of a [`Quote`].
///
/// The platform reports the outcome asynchronously, either by calling back
/// or by writing [`Quote::document_url`] directly.
#[derive(Clone, Debug)]
pub struct GenerateDocument {
    /// [`Quote`] to generate the document of.
    pub quote: Quote,

    /// [`Client`] the [`Quote`] is addressed to.
    pub client: Client,

    /// [`Vehicle`] the [`Quote`] is about.
    pub vehicle: Vehicle,
}

/// Request to email a generated [`Quote`] document.
#[derive(Clone, Debug)]
pub struct SendEmail {
    /// ID of the sent [`Quote`].
    pub quote_id: quote::Id,

    /// [`Email`] to send the document to.
    pub email: Email,

    /// [`document::Url`] of the generated PDF.
    pub document_url: document::Url,

    /// [`Subject`] of the email.
    pub subject: Subject,

    /// [`Body`] of the email.
    pub body: Body,
}

/// Webhook of the automation platform.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Webhook {
    /// [`GenerateDocument`] webhook.
    #[display("generate-document")]
    GenerateDocument,

    /// [`SendEmail`] webhook.
    #[display("send-email")]
    SendEmail,
}

/// [`Automation`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// URL of the [`Webhook`] is not configured.
    #[display("`{_0}` webhook URL is not configured")]
    #[from(ignore)]
    NotConfigured(#[error(not(source))] Webhook),

    /// [`Webhook`] didn't respond in time.
    #[display("`{_0}` webhook timed out")]
    #[from(ignore)]
    Timeout(#[error(not(source))] Webhook),

    /// [`Webhook`] responded with a non-2xx HTTP status code.
    #[display("`{webhook}` webhook responded with `{code}` status")]
    #[from(ignore)]
    Status {
        /// [`Webhook`] that responded.
        webhook: Webhook,

        /// HTTP status code of the response.
        code: u16,
    },

    /// Failed to deliver a request to a [`Webhook`].
    #[cfg(feature = "webhooks")]
    #[display("Failed to call a webhook: {_0}")]
    Transport(reqwest::Error),
}
