//! [`Command`] for completing the PDF document generation of a [`Quote`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::command::GenerateQuoteDocument;
use crate::{
    completion::Outcome,
    domain::{document, quote, Quote},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for completing the PDF document generation of a [`Quote`],
/// as reported back by the automation platform.
///
/// Wakes up the [`GenerateQuoteDocument`] waiting for it, if any.
#[derive(Clone, Debug)]
pub struct CompleteQuoteDocument {
    /// ID of the [`Quote`] the document is generated for.
    pub quote_id: quote::Id,

    /// [`Report`] of the automation platform.
    pub report: Report,
}

/// Report of a [`Quote`] document generation.
#[derive(Clone, Debug)]
pub enum Report {
    /// Document is available at the [`document::Url`].
    Generated(document::Url),

    /// Generation failed for the described reason.
    Failed(String),
}

impl<Db, Au> Command<CompleteQuoteDocument> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
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
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteQuoteDocument,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteQuoteDocument { quote_id, report } = cmd;

        let url = match report {
            Report::Generated(url) => url,
            Report::Failed(reason) => {
                let quote = self
                    .database()
                    .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::QuoteNotExists(quote_id))
                    .map_err(tracerr::wrap!())?;
                log::warn!(
                    "`Quote({})` document generation failed: {reason}",
                    quote.number,
                );
                _ = self
                    .completions()
                    .complete(quote_id, Outcome::Failed(reason));
                return Ok(quote);
            }
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut quote = tx
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;
        quote.attach_document(url.clone());

        tx.execute(Update(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if !self
            .completions()
            .complete(quote_id, Outcome::Completed(url))
        {
            log::debug!(
                "`Quote({})` document is completed unattended",
                quote.number,
            );
        }

        Ok(quote)
    }
}

/// Error of [`CompleteQuoteDocument`] [`Command`] execution.
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
