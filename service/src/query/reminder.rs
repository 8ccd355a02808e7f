//! [`Query`] collection related to [`Reminder`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{reminder, Reminder},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Reminder`] by its [`reminder::Id`].
pub type ById = DatabaseQuery<By<Option<Reminder>, reminder::Id>>;

/// Queries a list of [`Reminder`]s.
pub type List = DatabaseQuery<
    By<read::reminder::list::Page, read::reminder::list::Selector>,
>;

/// Queries total count of [`Reminder`]s.
pub type TotalCount = DatabaseQuery<By<read::reminder::list::TotalCount, ()>>;
