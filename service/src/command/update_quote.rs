//! [`Command`] for updating a [`Quote`].

use std::collections::HashMap;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        catalog, document, quote, totals::Discount, CatalogItem, Quote,
    },
    infra::{database, Database},
    Service,
};

use super::{
    line_draft::{self, LineDraft},
    Command,
};

/// [`Command`] for updating the contents of a [`Quote`].
///
/// Lines, discount, comments and validity are replaced as a whole, while the
/// [`quote::Status`] is left intact.
#[derive(Clone, Debug)]
pub struct UpdateQuote {
    /// ID of the [`Quote`] to be updated.
    pub quote_id: quote::Id,

    /// New [`LineDraft`]s of the [`Quote`].
    pub lines: Vec<LineDraft>,

    /// New [`Discount`] of the [`Quote`].
    pub discount: Option<Discount>,

    /// New [`document::Comments`] of the [`Quote`].
    pub comments: Option<document::Comments>,

    /// New [`quote::ValidityDate`] of the [`Quote`].
    pub valid_until: Option<quote::ValidityDate>,
}

impl<Db, Au> Command<UpdateQuote> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<HashMap<catalog::Id, CatalogItem>, Vec<catalog::Id>>,
            >,
            Ok = HashMap<catalog::Id, CatalogItem>,
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

    async fn execute(&self, cmd: UpdateQuote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateQuote {
            quote_id,
            lines,
            discount,
            comments,
            valid_until,
        } = cmd;

        let currency = self
            .database()
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?
            .currency;
        let lines =
            line_draft::resolve::<_, E>(self.database(), lines, currency)
                .await
                .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent edits of the same `Quote`.
        tx.execute(Lock(By::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut quote = tx
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;

        quote.lines = lines;
        quote.discount = discount;
        quote.comments = comments;
        quote.valid_until = valid_until;
        quote.updated_at = DateTime::now().coerce();
        if quote.totals().discount_exceeds_subtotal() {
            log::warn!(
                "`Quote({})` discount exceeds its subtotal",
                quote.number,
            );
        }

        tx.execute(Update(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(quote)
    }
}

/// Error of [`UpdateQuote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`LineDraft`] cannot be resolved.
    #[display("Invalid line: {_0}")]
    Line(line_draft::Error),

    /// [`Quote`] with the provided ID does not exist.
    #[display("`Quote(id: {_0})` does not exist")]
    #[from(ignore)]
    QuoteNotExists(#[error(not(source))] quote::Id),
}
