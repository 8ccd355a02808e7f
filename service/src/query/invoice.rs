//! [`Query`] collection related to [`Invoice`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{invoice, Invoice},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Invoice`] by its [`invoice::Id`].
pub type ById = DatabaseQuery<By<Option<Invoice>, invoice::Id>>;

/// Queries a list of [`Invoice`]s.
pub type List =
    DatabaseQuery<By<read::invoice::list::Page, read::invoice::list::Selector>>;

/// Queries total count of [`Invoice`]s.
pub type TotalCount = DatabaseQuery<By<read::invoice::list::TotalCount, ()>>;
