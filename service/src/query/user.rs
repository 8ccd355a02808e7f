//! [`Query`] collection related to [`User`]s.

use common::operations::By;

use crate::{
    domain::{user, User},
    read,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// Queries total count of registered [`User`]s.
pub type TotalCount = DatabaseQuery<By<read::user::TotalCount, ()>>;
