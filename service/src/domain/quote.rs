//! [`Quote`] definitions.

#[cfg(doc)]
use common::Date;
use common::{define_kind, unit, Currency, DateOf, DateTime, DateTimeOf};

use crate::domain::{
    client,
    document::{self, define_number},
    totals::Discount,
    vehicle, Line, Totals,
};
#[cfg(doc)]
use crate::domain::{Client, Vehicle};

use super::define_id;

/// Estimate of repair works offered to a [`Client`] ("devis").
#[derive(Clone, Debug)]
pub struct Quote {
    /// ID of this [`Quote`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Quote`].
    pub number: Number,

    /// ID of the [`Client`] this [`Quote`] is addressed to.
    pub client_id: client::Id,

    /// ID of the [`Vehicle`] this [`Quote`] is about.
    pub vehicle_id: vehicle::Id,

    /// Ordered [`Line`]s of this [`Quote`].
    pub lines: Vec<Line>,

    /// [`Discount`] applied to this [`Quote`], if any.
    pub discount: Option<Discount>,

    /// [`Currency`] of every amount in this [`Quote`].
    pub currency: Currency,

    /// [`Status`] of this [`Quote`].
    pub status: Status,

    /// URL of the generated PDF of this [`Quote`], if any.
    pub document_url: Option<document::Url>,

    /// Comments printed on this [`Quote`].
    pub comments: Option<document::Comments>,

    /// [`Date`] this [`Quote`] is valid until.
    pub valid_until: Option<ValidityDate>,

    /// [`DateTime`] when this [`Quote`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Quote`] was modified last time.
    pub updated_at: ModificationDateTime,

    /// [`DateTime`] when this [`Quote`] was sent to its [`Client`] last time.
    pub sent_at: Option<SendingDateTime>,
}

impl Quote {
    /// Computes [`Totals`] of this [`Quote`].
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::compute(
            &self.lines,
            self.discount,
            Totals::STANDARD_VAT,
            self.currency,
        )
    }

    /// Moves this [`Quote`] into the provided [`Status`], returning the
    /// previous one.
    ///
    /// Moving into [`Status::Sent`] from any other [`Status`] stamps
    /// [`Quote::sent_at`].
    pub fn set_status(&mut self, status: Status) -> Status {
        let previous = self.status;
        if previous == status {
            return previous;
        }

        let now = DateTime::now();
        if status == Status::Sent {
            self.sent_at = Some(now.coerce());
        }
        self.status = status;
        self.updated_at = now.coerce();

        previous
    }

    /// Attaches the generated PDF [`document::Url`] to this [`Quote`].
    ///
    /// A [`Status::Draft`] [`Quote`] becomes [`Status::Generated`], while any
    /// other [`Status`] is kept.
    pub fn attach_document(&mut self, url: document::Url) {
        self.document_url = Some(url);
        if self.status == Status::Draft {
            self.status = Status::Generated;
        }
        self.updated_at = DateTime::now().coerce();
    }
}

define_id! {
    /// ID of a [`Quote`].
    pub struct Id;
}

define_number! {
    /// Human-readable number of a [`Quote`], like `D-2024-00042`.
    pub struct Number;
    prefix = "D";
}

define_kind! {
    #[doc = "Status of a [`Quote`], being a column of the kanban board."]
    enum Status {
        #[doc = "[`Quote`] is being edited."]
        Draft = 1,

        #[doc = "PDF of the [`Quote`] has been generated."]
        Generated = 2,

        #[doc = "[`Quote`] has been sent to its [`Client`]."]
        Sent = 3,

        #[doc = "[`Client`] accepted the [`Quote`]."]
        Accepted = 4,

        #[doc = "[`Client`] refused the [`Quote`]."]
        Refused = 5,

        #[doc = "[`Client`] should be reminded about the [`Quote`]."]
        ToFollowUp = 6,
    }
}

/// [`Date`] a [`Quote`] is valid until.
pub type ValidityDate = DateOf<(Quote, unit::Expiration)>;

/// [`DateTime`] when a [`Quote`] was created.
pub type CreationDateTime = DateTimeOf<(Quote, unit::Creation)>;

/// [`DateTime`] when a [`Quote`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Quote, unit::Modification)>;

/// [`DateTime`] when a [`Quote`] was sent last time.
pub type SendingDateTime = DateTimeOf<(Quote, unit::Sending)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Currency, DateTime};

    use crate::domain::{client, document, line, vehicle, Line, Totals};

    use super::{Id, Number, Quote, Status};

    fn quote() -> Quote {
        let now = DateTime::now();
        Quote {
            id: Id::new(),
            number: Number::new(2024, 1),
            client_id: client::Id::new(),
            vehicle_id: vehicle::Id::new(),
            lines: vec![Line {
                kind: line::Kind::Service,
                designation: line::Designation::new("Vidange").unwrap(),
                quantity: line::Quantity::ONE,
                unit_price: line::UnitPrice::from_str("89.90").unwrap(),
                vat_rate: Totals::STANDARD_VAT,
                catalog_item_id: None,
            }],
            discount: None,
            currency: Currency::Eur,
            status: Status::Draft,
            document_url: None,
            comments: None,
            valid_until: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: None,
        }
    }

    #[test]
    fn status_names_are_canonical() {
        assert_eq!(Status::ToFollowUp.to_string(), "TO_FOLLOW_UP");
        assert_eq!(Status::from_str("ACCEPTED").unwrap(), Status::Accepted);
        assert_eq!(
            Status::ALL,
            &[
                Status::Draft,
                Status::Generated,
                Status::Sent,
                Status::Accepted,
                Status::Refused,
                Status::ToFollowUp,
            ],
        );
    }

    #[test]
    fn any_status_moves_to_any_other() {
        for &from in Status::ALL {
            for &to in Status::ALL {
                let mut q = quote();
                q.status = from;

                assert_eq!(q.set_status(to), from);
                assert_eq!(q.status, to);
            }
        }
    }

    #[test]
    fn stamps_sending_time() {
        let mut q = quote();
        _ = q.set_status(Status::Generated);
        assert!(q.sent_at.is_none());

        _ = q.set_status(Status::Sent);
        let sent_at = q.sent_at.unwrap();

        _ = q.set_status(Status::Sent);
        assert_eq!(q.sent_at, Some(sent_at));
    }

    #[test]
    fn attaching_document_generates_draft_only() {
        let url = document::Url::new("https://cdn.example.com/d.pdf").unwrap();

        let mut q = quote();
        q.attach_document(url.clone());
        assert_eq!(q.status, Status::Generated);
        assert_eq!(q.document_url.as_ref(), Some(&url));

        let mut q = quote();
        q.status = Status::Accepted;
        q.attach_document(url);
        assert_eq!(q.status, Status::Accepted);
    }

    #[test]
    fn totals_follow_lines() {
        let q = quote();
        assert_eq!(q.totals().total.to_string(), "107.88EUR");
    }
}
