//! [`Reminder`] definitions.

#[cfg(doc)]
use common::{Date, DateTime};
use common::{unit, DateOf, DateTimeOf};

#[cfg(doc)]
use crate::domain::{Client, Invoice, Quote};
use crate::domain::{client, invoice, quote};

use super::{define_id, define_text};

/// Follow-up task about a [`Client`].
#[derive(Clone, Debug)]
pub struct Reminder {
    /// ID of this [`Reminder`].
    pub id: Id,

    /// ID of the [`Client`] to follow up.
    pub client_id: client::Id,

    /// ID of the [`Quote`] this [`Reminder`] is about, if any.
    pub quote_id: Option<quote::Id>,

    /// ID of the [`Invoice`] this [`Reminder`] is about, if any.
    pub invoice_id: Option<invoice::Id>,

    /// [`Note`] describing what to do.
    pub note: Note,

    /// [`Date`] this [`Reminder`] is due on.
    pub due_on: DueDate,

    /// [`DateTime`] when this [`Reminder`] was done.
    pub done_at: Option<CompletionDateTime>,

    /// [`DateTime`] when this [`Reminder`] was created.
    pub created_at: CreationDateTime,
}

impl Reminder {
    /// Indicates whether this [`Reminder`] is done.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done_at.is_some()
    }
}

define_id! {
    /// ID of a [`Reminder`].
    pub struct Id;
}

define_text! {
    /// Note of a [`Reminder`].
    pub struct Note;
    max_len = 1024;
    multiline = true;
}

/// [`Date`] a [`Reminder`] is due on.
pub type DueDate = DateOf<(Reminder, unit::Due)>;

/// [`DateTime`] when a [`Reminder`] was done.
pub type CompletionDateTime = DateTimeOf<(Reminder, unit::Completion)>;

/// [`DateTime`] when a [`Reminder`] was created.
pub type CreationDateTime = DateTimeOf<(Reminder, unit::Creation)>;
