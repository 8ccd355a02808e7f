//! [`Database`]-related implementations.

#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}

impl Error {
    /// Checks if this [`Error`] is a unique violation of the specified
    /// constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_unique_violation(constraint),
        }
    }

    /// Checks if this [`Error`] is a foreign key violation of the specified
    /// constraint.
    #[must_use]
    pub fn is_foreign_key_violation(&self, constraint: Option<&str>) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_foreign_key_violation(constraint),
        }
    }

    /// Checks if this [`Error`] is caused by lacking privileges.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match *self {
            #[cfg(feature = "postgres")]
            Self::Postgres(ref e) => e.is_permission_denied(),
        }
    }
}
