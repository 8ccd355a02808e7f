//! [`Command`] for updating a [`CatalogItem`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{catalog, CatalogItem},
    infra::{database, Database},
    Service,
};

use super::{create_catalog_item::Pricing, Command};

/// [`Command`] for updating a [`CatalogItem`].
///
/// Changing the [`Pricing`] kind turns a service into a part and vice versa.
/// Already issued documents keep their prefilled lines intact.
#[derive(Clone, Debug)]
pub struct UpdateCatalogItem {
    /// ID of the [`CatalogItem`] to be updated.
    pub item_id: catalog::Id,

    /// New [`catalog::Label`] of the [`CatalogItem`].
    pub label: catalog::Label,

    /// New [`Pricing`] of the [`CatalogItem`].
    pub pricing: Pricing,
}

impl<Db, Au> Command<UpdateCatalogItem> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<CatalogItem, catalog::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<CatalogItem>, catalog::Id>>,
            Ok = Option<CatalogItem>,
            Err = Traced<database::Error>,
        > + Database<
            Update<CatalogItem>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = CatalogItem;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateCatalogItem,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCatalogItem {
            item_id,
            label,
            pricing,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let current = tx
            .execute(Select(By::<Option<CatalogItem>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CatalogItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;

        let price = pricing.base_price();
        let item = pricing
            .into_item(item_id, label, current.created_at())
            .ok_or(E::PriceOutOfRange(price))
            .map_err(tracerr::wrap!())?;
        tx.execute(Update(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(item)
    }
}

/// Error of [`UpdateCatalogItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`CatalogItem`] with the provided ID does not exist.
    #[display("`CatalogItem(id: {_0})` does not exist")]
    #[from(ignore)]
    CatalogItemNotExists(#[error(not(source))] catalog::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Price of the [`CatalogItem`] is out of the allowed range.
    #[display("`{_0}` is out of the allowed catalog price range")]
    #[from(ignore)]
    PriceOutOfRange(#[error(not(source))] Money),
}
