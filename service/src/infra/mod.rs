//! Infrastructure layer.

pub mod automation;
pub mod database;
#[cfg(all(test, feature = "postgres"))]
pub(crate) mod memory;

#[cfg(feature = "webhooks")]
pub use self::automation::Webhooks;
pub use self::{automation::Automation, database::Database};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
