//! [`Query`] collection related to [`Client`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{client, Client},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Client`] by its [`client::Id`].
pub type ById = DatabaseQuery<By<Option<Client>, client::Id>>;

/// Queries a list of [`Client`]s.
pub type List =
    DatabaseQuery<By<read::client::list::Page, read::client::list::Selector>>;

/// Queries total count of [`Client`]s.
pub type TotalCount = DatabaseQuery<By<read::client::list::TotalCount, ()>>;
