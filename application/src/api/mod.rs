//! GraphQL API definitions.

pub mod catalog;
pub mod client;
pub mod contact;
pub mod document;
pub mod invoice;
mod list;
mod mutation;
mod query;
pub mod quote;
pub mod reminder;
pub mod scalar;
mod subscription;
pub mod user;
pub mod vehicle;

use crate::define_error;

pub use self::{
    catalog::CatalogItem, client::Client, invoice::Invoice,
    mutation::Mutation, query::Query, quote::Quote, reminder::Reminder,
    subscription::Subscription, user::User, vehicle::Vehicle,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}

define_error! {
    enum NotExistsError {
        #[code = "CLIENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Client` does not exist"]
        Client,

        #[code = "VEHICLE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Vehicle` does not exist"]
        Vehicle,

        #[code = "CATALOG_ITEM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`CatalogItem` does not exist"]
        CatalogItem,

        #[code = "QUOTE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Quote` does not exist"]
        Quote,

        #[code = "INVOICE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Invoice` does not exist"]
        Invoice,

        #[code = "REMINDER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Reminder` does not exist"]
        Reminder,

        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        User,
    }
}

define_error! {
    enum InputError {
        #[code = "INVALID_LINE"]
        #[status = BAD_REQUEST]
        #[message = "Line must reference a catalog item or specify its \
                     kind, designation and unit price"]
        Line,

        #[code = "INVALID_DISCOUNT"]
        #[status = BAD_REQUEST]
        #[message = "Discount must be either a percentage or an amount"]
        Discount,

        #[code = "INVALID_YEAR"]
        #[status = BAD_REQUEST]
        #[message = "Year is out of the supported range"]
        Year,

        #[code = "INVALID_MILEAGE"]
        #[status = BAD_REQUEST]
        #[message = "Mileage is out of the supported range"]
        Mileage,
    }
}
