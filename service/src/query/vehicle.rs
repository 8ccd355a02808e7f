//! [`Query`] collection related to [`Vehicle`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{vehicle, Vehicle},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Vehicle`] by its [`vehicle::Id`].
pub type ById = DatabaseQuery<By<Option<Vehicle>, vehicle::Id>>;

/// Queries a list of [`Vehicle`]s.
pub type List =
    DatabaseQuery<By<read::vehicle::list::Page, read::vehicle::list::Selector>>;

/// Queries total count of [`Vehicle`]s.
pub type TotalCount = DatabaseQuery<By<read::vehicle::list::TotalCount, ()>>;
