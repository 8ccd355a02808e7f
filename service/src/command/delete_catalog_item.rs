//! [`Command`] for deleting a [`CatalogItem`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Line;
use crate::{
    domain::{catalog, CatalogItem},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`CatalogItem`].
///
/// [`Line`]s prefilled from the [`CatalogItem`] are kept, losing the
/// reference to it.
#[derive(Clone, Copy, Debug)]
pub struct DeleteCatalogItem {
    /// ID of the [`CatalogItem`] to be deleted.
    pub item_id: catalog::Id,
}

impl<Db, Au> Command<DeleteCatalogItem> for Service<Db, Au>
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
            Delete<By<CatalogItem, catalog::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = CatalogItem;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteCatalogItem,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCatalogItem { item_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let item = tx
            .execute(Select(By::<Option<CatalogItem>, _>::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CatalogItemNotExists(item_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::new(item_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(item)
    }
}

/// Error of [`DeleteCatalogItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`CatalogItem`] with the provided ID does not exist.
    #[display("`CatalogItem(id: {_0})` does not exist")]
    #[from(ignore)]
    CatalogItemNotExists(#[error(not(source))] catalog::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
