//! Read entities definitions.

pub mod catalog;
pub mod client;
pub mod invoice;
pub mod quote;
pub mod reminder;
pub mod user;
pub mod vehicle;
