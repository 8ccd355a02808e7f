//! [`Client`] definitions.

use common::{define_kind, unit, DateTimeOf};

#[cfg(doc)]
use common::DateTime;

pub use super::contact::{Address, Email, Phone};
use super::{define_id, define_text};

/// Customer of the garage.
#[derive(Clone, Debug)]
pub struct Client {
    /// ID of this [`Client`].
    pub id: Id,

    /// [`Kind`] of this [`Client`].
    pub kind: Kind,

    /// [`Name`] of this [`Client`].
    pub name: Name,

    /// [`Email`] of this [`Client`].
    pub email: Option<Email>,

    /// [`Phone`] of this [`Client`].
    pub phone: Option<Phone>,

    /// [`Address`] of this [`Client`].
    pub address: Option<Address>,

    /// [`Notes`] about this [`Client`].
    pub notes: Option<Notes>,

    /// [`Status`] of this [`Client`].
    pub status: Status,

    /// [`DateTime`] when this [`Client`] was created.
    pub created_at: CreationDateTime,
}

impl Client {
    /// Indicates whether this [`Client`] is archived.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status == Status::Archived
    }
}

define_id! {
    /// ID of a [`Client`].
    pub struct Id;
}

define_text! {
    /// Full name of a person or a company name.
    pub struct Name;
    max_len = 256;
    multiline = false;
}

define_text! {
    /// Free-form notes about a [`Client`].
    pub struct Notes;
    max_len = 4096;
    multiline = true;
}

define_kind! {
    #[doc = "Kind of a [`Client`]."]
    enum Kind {
        #[doc = "Private person."]
        Individual = 1,

        #[doc = "Company or a self-employed professional."]
        Professional = 2,
    }
}

define_kind! {
    #[doc = "Status of a [`Client`]."]
    enum Status {
        #[doc = "[`Client`] is active."]
        Active = 1,

        #[doc = "[`Client`] is archived and hidden by default."]
        Archived = 2,
    }
}

/// [`DateTime`] when a [`Client`] was created.
pub type CreationDateTime = DateTimeOf<(Client, unit::Creation)>;
