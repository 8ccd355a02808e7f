//! [`ComputeTotals`] definition.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    Currency,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};
use crate::{
    command::line_draft::{self, LineDraft},
    domain::{catalog, totals::Discount, CatalogItem, Totals},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] previewing the [`Totals`] of a [`Quote`] or an [`Invoice`]
/// being edited.
#[derive(Clone, Debug)]
pub struct ComputeTotals {
    /// [`LineDraft`]s to compute the [`Totals`] of.
    pub lines: Vec<LineDraft>,

    /// [`Discount`] to apply, if any.
    pub discount: Option<Discount>,

    /// [`Currency`] of the document, if not the default one.
    pub currency: Option<Currency>,
}

impl<Db, Au> Query<ComputeTotals> for Service<Db, Au>
where
    Db: Database<
        Select<By<HashMap<catalog::Id, CatalogItem>, Vec<catalog::Id>>>,
        Ok = HashMap<catalog::Id, CatalogItem>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Totals;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ComputeTotals,
    ) -> Result<Self::Ok, Self::Err> {
        let ComputeTotals {
            lines,
            discount,
            currency,
        } = query;

        let currency = currency.unwrap_or(self.config().currency);
        let lines = line_draft::resolve::<_, ExecutionError>(
            self.database(),
            lines,
            currency,
        )
        .await?;

        Ok(Totals::compute(
            &lines,
            discount,
            Totals::STANDARD_VAT,
            currency,
        ))
    }
}

/// Error of [`ComputeTotals`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`LineDraft`] cannot be resolved.
    #[display("Invalid line: {_0}")]
    Line(line_draft::Error),
}
