//! [`Invoice`] definitions.

use common::{
    define_kind, unit, Currency, Date, DateOf, DateTime, DateTimeOf,
};

use crate::domain::{
    client,
    document::{self, define_number},
    quote,
    totals::Discount,
    vehicle, Line, Quote, Totals,
};
#[cfg(doc)]
use crate::domain::{Client, Vehicle};

use super::define_id;

/// Bill issued to a [`Client`] ("facture").
#[derive(Clone, Debug)]
pub struct Invoice {
    /// ID of this [`Invoice`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Invoice`].
    pub number: Number,

    /// ID of the [`Client`] this [`Invoice`] is addressed to.
    pub client_id: client::Id,

    /// ID of the [`Vehicle`] this [`Invoice`] is about, if any.
    pub vehicle_id: Option<vehicle::Id>,

    /// ID of the [`Quote`] this [`Invoice`] was created from, if any.
    pub quote_id: Option<quote::Id>,

    /// Ordered [`Line`]s of this [`Invoice`].
    pub lines: Vec<Line>,

    /// [`Discount`] applied to this [`Invoice`], if any.
    pub discount: Option<Discount>,

    /// [`Currency`] of every amount in this [`Invoice`].
    pub currency: Currency,

    /// [`Date`] this [`Invoice`] should be paid by.
    pub due_on: DueDate,

    /// [`Payment`] of this [`Invoice`], once recorded.
    pub payment: Option<Payment>,

    /// URL of the generated PDF of this [`Invoice`], if any.
    pub document_url: Option<document::Url>,

    /// Comments printed on this [`Invoice`].
    pub comments: Option<document::Comments>,

    /// [`DateTime`] when this [`Invoice`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Invoice`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Invoice {
    /// Number of days an [`Invoice`] is due in by default.
    pub const DEFAULT_TERM_DAYS: u16 = 30;

    /// Creates a new unpaid [`Invoice`] billing the provided [`Quote`].
    #[must_use]
    pub fn from_quote(quote: &Quote, number: Number, due_on: DueDate) -> Self {
        let now = DateTime::now();
        Self {
            id: Id::new(),
            number,
            client_id: quote.client_id,
            vehicle_id: Some(quote.vehicle_id),
            quote_id: Some(quote.id),
            lines: quote.lines.clone(),
            discount: quote.discount,
            currency: quote.currency,
            due_on,
            payment: None,
            document_url: None,
            comments: quote.comments.clone(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    /// Computes [`Totals`] of this [`Invoice`].
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::compute(
            &self.lines,
            self.discount,
            Totals::STANDARD_VAT,
            self.currency,
        )
    }

    /// Returns [`PaymentStatus`] of this [`Invoice`] as of the provided
    /// `today`.
    #[must_use]
    pub fn payment_status_on(&self, today: Date) -> PaymentStatus {
        if self.payment.is_some() {
            PaymentStatus::Paid
        } else if today > self.due_on.coerce() {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Pending
        }
    }

    /// Returns the current [`PaymentStatus`] of this [`Invoice`].
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status_on(Date::today())
    }
}

/// Payment of an [`Invoice`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Payment {
    /// [`PaymentMethod`] the [`Invoice`] was paid with.
    pub method: PaymentMethod,

    /// [`Date`] the [`Invoice`] was paid on.
    pub paid_on: PaymentDate,
}

define_id! {
    /// ID of an [`Invoice`].
    pub struct Id;
}

define_number! {
    /// Human-readable number of an [`Invoice`], like `F-2024-00042`.
    pub struct Number;
    prefix = "F";
}

define_kind! {
    #[doc = "Method an [`Invoice`] was paid with."]
    enum PaymentMethod {
        #[doc = "Cash."]
        Cash = 1,

        #[doc = "Bank card."]
        Card = 2,

        #[doc = "Cheque."]
        Check = 3,

        #[doc = "Bank transfer."]
        Transfer = 4,
    }
}

define_kind! {
    #[doc = "Payment status of an [`Invoice`], derived from its [`Payment`] \
             and due date."]
    enum PaymentStatus {
        #[doc = "Not paid yet, and not due yet."]
        Pending = 1,

        #[doc = "[`Payment`] has been recorded."]
        Paid = 2,

        #[doc = "Not paid past the due date."]
        Overdue = 3,
    }
}

/// [`Date`] an [`Invoice`] should be paid by.
pub type DueDate = DateOf<(Invoice, unit::Due)>;

/// [`Date`] an [`Invoice`] was paid on.
pub type PaymentDate = DateOf<(Invoice, unit::Payment)>;

/// [`DateTime`] when an [`Invoice`] was created.
pub type CreationDateTime = DateTimeOf<(Invoice, unit::Creation)>;

/// [`DateTime`] when an [`Invoice`] was modified last time.
pub type ModificationDateTime = DateTimeOf<(Invoice, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::{Currency, Date, DateTime};

    use crate::domain::{client, quote, totals::Discount, vehicle, Quote};

    use super::{Invoice, Number, Payment, PaymentMethod, PaymentStatus};

    fn invoice(due_on: &str) -> Invoice {
        let now = DateTime::now();
        let quote = Quote {
            id: quote::Id::new(),
            number: quote::Number::new(2024, 3),
            client_id: client::Id::new(),
            vehicle_id: vehicle::Id::new(),
            lines: vec![],
            discount: Some(Discount::Percent(common::Percent::whole(5))),
            currency: Currency::Chf,
            status: quote::Status::Accepted,
            document_url: None,
            comments: None,
            valid_until: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: None,
        };

        let invoice = Invoice::from_quote(
            &quote,
            Number::new(2024, 9),
            Date::parse(due_on).unwrap().coerce(),
        );
        assert_eq!(invoice.quote_id, Some(quote.id));
        assert_eq!(invoice.client_id, quote.client_id);
        assert_eq!(invoice.discount, quote.discount);
        assert_eq!(invoice.currency, Currency::Chf);
        invoice
    }

    #[test]
    fn derives_payment_status() {
        let today = Date::parse("2024-06-15").unwrap();

        let inv = invoice("2024-06-15");
        assert_eq!(inv.payment_status_on(today), PaymentStatus::Pending);

        let inv = invoice("2024-06-14");
        assert_eq!(inv.payment_status_on(today), PaymentStatus::Overdue);

        let mut inv = invoice("2024-06-01");
        inv.payment = Some(Payment {
            method: PaymentMethod::Transfer,
            paid_on: today.coerce(),
        });
        assert_eq!(inv.payment_status_on(today), PaymentStatus::Paid);
    }
}
