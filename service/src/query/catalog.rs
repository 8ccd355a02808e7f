//! [`Query`] collection related to [`CatalogItem`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{catalog, CatalogItem},
    read,
};

use super::DatabaseQuery;

/// Queries a [`CatalogItem`] by its [`catalog::Id`].
pub type ById = DatabaseQuery<By<Option<CatalogItem>, catalog::Id>>;

/// Queries a list of [`CatalogItem`]s.
pub type List =
    DatabaseQuery<By<read::catalog::list::Page, read::catalog::list::Selector>>;

/// Queries total count of [`CatalogItem`]s.
pub type TotalCount = DatabaseQuery<By<read::catalog::list::TotalCount, ()>>;
