//! Automation platform callbacks.
//!
//! The automation platform reports the outcome of a long-running job (like a
//! PDF generation) by calling back an HTTP endpoint of this application.

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Extension, Json,
};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::{
    command::{
        self,
        complete_quote_document::{ExecutionError, Report},
        Command as _,
    },
    domain::{document, quote},
};
use subtle::ConstantTimeEq as _;
use tracing as log;
use uuid::Uuid;

use crate::Service;

/// Name of the HTTP header carrying the callback token.
pub const TOKEN_HEADER: &str = "X-Automation-Token";

/// Configuration of the callback endpoints.
#[derive(Debug, Default)]
pub struct Config {
    /// Token the automation platform must present.
    ///
    /// Callbacks are refused when [`None`].
    pub token: Option<SecretString>,
}

impl Config {
    /// Checks whether the provided `token` authorizes a callback.
    ///
    /// Comparison takes the same time whatever the matching prefix is.
    #[must_use]
    pub fn authorizes(&self, token: Option<&str>) -> bool {
        match (&self.token, token) {
            (Some(expected), Some(actual)) => {
                let expected = expected.expose_secret().as_bytes();
                expected.ct_eq(actual.as_bytes()).into()
            }
            (None, _) | (_, None) => false,
        }
    }
}

/// Body of a quote document generation callback.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    /// ID of the generated `Quote`.
    #[serde(rename = "devisId", alias = "quoteId")]
    pub quote_id: Uuid,

    /// URL of the generated PDF, if succeeded.
    #[serde(default)]
    pub pdf_url: Option<String>,

    /// Reason of the failure, if failed.
    #[serde(default)]
    pub error: Option<String>,
}

impl QuoteDocument {
    /// Converts this [`QuoteDocument`] into a [`Report`] about the `Quote`
    /// with the returned ID.
    ///
    /// A PDF URL takes precedence over an error.
    ///
    /// # Errors
    ///
    /// If the PDF URL is malformed, or neither a PDF URL nor an error is
    /// provided.
    pub fn into_report(self) -> Result<(quote::Id, Report), &'static str> {
        let Self {
            quote_id,
            pdf_url,
            error,
        } = self;
        let report = match (pdf_url, error) {
            (Some(url), _) => Report::Generated(
                document::Url::new(url).ok_or("malformed `pdfUrl`")?,
            ),
            (None, Some(reason)) => Report::Failed(reason),
            (None, None) => return Err("either `pdfUrl` or `error` expected"),
        };
        Ok((quote_id.into(), report))
    }
}

/// Handles the quote document generation callback.
pub async fn quote_document(
    Extension(service): Extension<Service>,
    Extension(config): Extension<Arc<Config>>,
    headers: http::HeaderMap,
    body: Result<Json<QuoteDocument>, JsonRejection>,
) -> Response {
    let token = headers.get(TOKEN_HEADER).and_then(|h| h.to_str().ok());
    if !config.authorizes(token) {
        log::warn!("refused unauthorized quote document callback");
        return http::StatusCode::FORBIDDEN.into_response();
    }

    let (quote_id, report) = match body
        .map_err(|e| e.body_text())
        .and_then(|Json(b)| b.into_report().map_err(ToOwned::to_owned))
    {
        Ok(r) => r,
        Err(e) => {
            log::warn!("malformed quote document callback: {e}");
            return (http::StatusCode::BAD_REQUEST, e).into_response();
        }
    };

    match service
        .execute(command::CompleteQuoteDocument { quote_id, report })
        .await
    {
        Ok(_) => http::StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            if let ExecutionError::QuoteNotExists(_) = e.as_ref() {
                log::warn!("quote document callback: {e}");
                http::StatusCode::NOT_FOUND.into_response()
            } else {
                log::error!("failed to complete quote document: {e}");
                http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::SecretString;
    use service::command::complete_quote_document::Report;
    use uuid::Uuid;

    use super::{Config, QuoteDocument};

    fn payload(pdf_url: Option<&str>, error: Option<&str>) -> QuoteDocument {
        QuoteDocument {
            quote_id: Uuid::new_v4(),
            pdf_url: pdf_url.map(ToOwned::to_owned),
            error: error.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn authorizes_only_matching_token() {
        let config = Config {
            token: Some(SecretString::from("s3cr3t")),
        };
        assert!(config.authorizes(Some("s3cr3t")));
        assert!(!config.authorizes(Some("guess")));
        assert!(!config.authorizes(Some("s3cr3T")));
        assert!(!config.authorizes(Some("s3cr")));
        assert!(!config.authorizes(Some("s3cr3t!")));
        assert!(!config.authorizes(Some("")));
        assert!(!config.authorizes(None));

        let unset = Config::default();
        assert!(!unset.authorizes(Some("s3cr3t")));
        assert!(!unset.authorizes(None));
    }

    #[test]
    fn converts_into_report() {
        let (_, report) = payload(Some("https://cdn.example.com/d.pdf"), None)
            .into_report()
            .unwrap();
        assert!(matches!(report, Report::Generated(_)));

        let (_, report) =
            payload(None, Some("template missing")).into_report().unwrap();
        assert!(
            matches!(report, Report::Failed(r) if r == "template missing"),
        );

        let (_, report) =
            payload(Some("https://cdn.example.com/d.pdf"), Some("ignored"))
                .into_report()
                .unwrap();
        assert!(matches!(report, Report::Generated(_)));
    }

    #[test]
    fn rejects_malformed_reports() {
        assert!(payload(None, None).into_report().is_err());
        assert!(payload(Some("not a url"), None).into_report().is_err());
    }
}
