//! [`Query`] collection related to [`Quote`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{quote, Quote},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Quote`] by its [`quote::Id`].
pub type ById = DatabaseQuery<By<Option<Quote>, quote::Id>>;

/// Queries a list of [`Quote`]s.
pub type List =
    DatabaseQuery<By<read::quote::list::Page, read::quote::list::Selector>>;

/// Queries total count of [`Quote`]s.
pub type TotalCount = DatabaseQuery<By<read::quote::list::TotalCount, ()>>;

/// Queries the [`read::quote::Board`] of all [`Quote`]s.
pub type Board = DatabaseQuery<By<read::quote::Board, ()>>;
