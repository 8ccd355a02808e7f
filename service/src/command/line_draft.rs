//! [`LineDraft`] definitions shared by [`Quote`] and [`Invoice`]
//! [`Command`]s.
//!
//! [`Command`]: super::Command

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    Currency, Percent,
};
use derive_more::Display;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};
use crate::{
    domain::{catalog, line, CatalogItem, Line, Totals},
    infra::{database, Database},
};

/// Draft of a [`Line`] to be put into a [`Quote`] or an [`Invoice`].
#[derive(Clone, Debug)]
pub enum LineDraft {
    /// [`Line`] described explicitly.
    Free {
        /// [`line::Kind`] of the [`Line`].
        kind: line::Kind,

        /// [`line::Designation`] of the [`Line`].
        designation: line::Designation,

        /// [`line::Quantity`] of the [`Line`].
        quantity: line::Quantity,

        /// [`line::UnitPrice`] of the [`Line`].
        unit_price: line::UnitPrice,

        /// VAT rate printed on the [`Line`], if not the standard one.
        vat_rate: Option<Percent>,
    },

    /// [`Line`] prefilled from a [`CatalogItem`].
    Catalog {
        /// ID of the [`CatalogItem`] to prefill the [`Line`] from.
        item_id: catalog::Id,

        /// [`line::Quantity`] of the [`Line`].
        quantity: line::Quantity,
    },
}

/// Error of resolving [`LineDraft`]s into [`Line`]s.
#[derive(Debug, Display, derive_more::Error)]
pub enum Error {
    /// [`CatalogItem`] with the provided ID does not exist.
    #[display("`CatalogItem(id: {_0})` does not exist")]
    CatalogItemNotExists(#[error(not(source))] catalog::Id),

    /// [`CatalogItem`] is priced in a different [`Currency`].
    #[display("`CatalogItem(id: {_0})` is priced in another currency")]
    CurrencyMismatch(#[error(not(source))] catalog::Id),
}

/// Resolves the provided [`LineDraft`]s into [`Line`]s priced in the given
/// [`Currency`], preserving their order.
///
/// # Errors
///
/// If a referenced [`CatalogItem`] doesn't exist or is priced in another
/// [`Currency`].
pub(crate) async fn resolve<Db, E>(
    db: &Db,
    drafts: Vec<LineDraft>,
    currency: Currency,
) -> Result<Vec<Line>, Traced<E>>
where
    Db: Database<
        Select<By<HashMap<catalog::Id, CatalogItem>, Vec<catalog::Id>>>,
        Ok = HashMap<catalog::Id, CatalogItem>,
        Err = Traced<database::Error>,
    >,
    E: From<database::Error> + From<Error>,
{
    let ids = drafts
        .iter()
        .filter_map(|d| match d {
            LineDraft::Catalog { item_id, .. } => Some(*item_id),
            LineDraft::Free { .. } => None,
        })
        .collect::<Vec<_>>();
    let items = if ids.is_empty() {
        HashMap::new()
    } else {
        db.execute(Select(By::new(ids)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
    };

    drafts
        .into_iter()
        .map(|d| match d {
            LineDraft::Free {
                kind,
                designation,
                quantity,
                unit_price,
                vat_rate,
            } => Ok(Line {
                kind,
                designation,
                quantity,
                unit_price,
                vat_rate: vat_rate.unwrap_or(Totals::STANDARD_VAT),
                catalog_item_id: None,
            }),
            LineDraft::Catalog { item_id, quantity } => {
                let item = items
                    .get(&item_id)
                    .ok_or(Error::CatalogItemNotExists(item_id))
                    .map_err(tracerr::from_and_wrap!(=> E))?;
                Line::from_catalog(item, quantity, currency)
                    .ok_or(Error::CurrencyMismatch(item_id))
                    .map_err(tracerr::from_and_wrap!(=> E))
            }
        })
        .collect()
}

#[cfg(test)]
mod spec {
    use crate::domain::catalog;

    use super::Error;

    #[test]
    fn describes_unresolvable_lines() {
        let id = catalog::Id::new();

        let err = Error::CatalogItemNotExists(id);
        assert_eq!(
            err.to_string(),
            format!("`CatalogItem(id: {id})` does not exist"),
        );

        let err: Box<dyn std::error::Error> =
            Box::new(Error::CurrencyMismatch(id));
        assert!(err.source().is_none());
        assert!(err.to_string().ends_with("is priced in another currency"));
    }
}
