//! Background [`Task`]s definitions.

mod background;
pub mod follow_up_quotes;

pub use common::Handler as Task;

pub use self::{background::Background, follow_up_quotes::FollowUpQuotes};
