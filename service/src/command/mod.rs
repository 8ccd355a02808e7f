//! [`Command`] definition.

pub mod authorize_user_session;
pub mod change_client_status;
pub mod change_quote_status;
pub mod complete_quote_document;
pub mod complete_reminder;
pub mod create_catalog_item;
pub mod create_client;
pub mod create_invoice;
pub mod create_invoice_from_quote;
pub mod create_quote;
pub mod create_reminder;
pub mod create_user;
pub mod create_user_session;
pub mod create_vehicle;
pub mod delete_catalog_item;
pub mod delete_client;
pub mod delete_invoice;
pub mod delete_quote;
pub mod delete_reminder;
pub mod delete_vehicle;
pub mod generate_quote_document;
pub mod line_draft;
pub mod record_invoice_payment;
pub mod send_quote;
pub mod update_catalog_item;
pub mod update_client;
pub mod update_invoice;
pub mod update_quote;
pub mod update_vehicle;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    change_client_status::ChangeClientStatus,
    change_quote_status::ChangeQuoteStatus,
    complete_quote_document::CompleteQuoteDocument,
    complete_reminder::CompleteReminder,
    create_catalog_item::CreateCatalogItem,
    create_client::CreateClient,
    create_invoice::CreateInvoice,
    create_invoice_from_quote::CreateInvoiceFromQuote,
    create_quote::CreateQuote,
    create_reminder::CreateReminder,
    create_user::CreateUser,
    create_user_session::CreateUserSession,
    create_vehicle::CreateVehicle,
    delete_catalog_item::DeleteCatalogItem,
    delete_client::DeleteClient,
    delete_invoice::DeleteInvoice,
    delete_quote::DeleteQuote,
    delete_reminder::DeleteReminder,
    delete_vehicle::DeleteVehicle,
    generate_quote_document::GenerateQuoteDocument,
    line_draft::LineDraft,
    record_invoice_payment::RecordInvoicePayment,
    send_quote::SendQuote,
    update_catalog_item::UpdateCatalogItem,
    update_client::UpdateClient,
    update_invoice::UpdateInvoice,
    update_quote::UpdateQuote,
    update_vehicle::UpdateVehicle,
};
