//! In-memory [`Database`] and [`Automation`] backing [`Service`] tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use common::{
    operations::{
        By, Commit, Insert, Lock, Perform, Select, Transact, Update,
    },
    Currency, DateTime,
};
use tracerr::Traced;

use crate::{
    completion::{Completions, WaitConfig},
    domain::{
        client, contact, document, invoice, quote, vehicle, Client, Invoice,
        Quote, Reminder, Vehicle,
    },
    infra::{
        automation::{self, GenerateDocument, SendEmail, Webhook},
        database::{self, postgres},
        Automation, Database,
    },
    read, task, Config, Service,
};

/// Contents of a [`Memory`] database.
#[derive(Debug, Default)]
pub(crate) struct State {
    /// Stored [`Client`]s.
    pub(crate) clients: HashMap<client::Id, Client>,

    /// Stored [`Vehicle`]s.
    pub(crate) vehicles: HashMap<vehicle::Id, Vehicle>,

    /// Stored [`Quote`]s.
    pub(crate) quotes: HashMap<quote::Id, Quote>,

    /// Stored [`Invoice`]s.
    pub(crate) invoices: HashMap<invoice::Id, Invoice>,

    /// Stored [`Reminder`]s.
    pub(crate) reminders: Vec<Reminder>,

    /// [`Quote`]s failing to be updated.
    pub(crate) broken_quotes: HashSet<quote::Id>,

    /// Last issued [`invoice::Number`] sequence value.
    pub(crate) invoice_sequence: i64,
}

/// In-memory [`Database`].
///
/// Transactions write through immediately.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory(Arc<Mutex<State>>);

impl Memory {
    /// Locks the [`State`] of this [`Memory`] database.
    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the provided [`Client`] and returns its ID.
    pub(crate) fn add_client(&self, client: Client) -> client::Id {
        let id = client.id;
        drop(self.state().clients.insert(id, client));
        id
    }

    /// Stores the provided [`Vehicle`] and returns its ID.
    pub(crate) fn add_vehicle(&self, vehicle: Vehicle) -> vehicle::Id {
        let id = vehicle.id;
        drop(self.state().vehicles.insert(id, vehicle));
        id
    }

    /// Stores the provided [`Quote`] and returns its ID.
    pub(crate) fn add_quote(&self, quote: Quote) -> quote::Id {
        let id = quote.id;
        drop(self.state().quotes.insert(id, quote));
        id
    }

    /// Stores the provided [`Invoice`] and returns its ID.
    pub(crate) fn add_invoice(&self, invoice: Invoice) -> invoice::Id {
        let id = invoice.id;
        drop(self.state().invoices.insert(id, invoice));
        id
    }

    /// Returns the stored [`Quote`] with the provided ID.
    pub(crate) fn quote(&self, id: quote::Id) -> Option<Quote> {
        self.state().quotes.get(&id).cloned()
    }
}

/// Returns a [`database::Error`] as if the connection was lost.
fn failure() -> Traced<database::Error> {
    tracerr::new!(database::Error::from(postgres::Error::from(
        postgres::connection::PoolError::Closed,
    )))
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Quote, quote::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Quote, quote::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Invoice, invoice::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Invoice, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

/// Implements selecting an entity by its ID from a [`State`] field.
macro_rules! impl_select_by_id {
    ($entity:ty, $id:ty, $field:ident) => {
        impl Database<Select<By<Option<$entity>, $id>>> for Memory {
            type Ok = Option<$entity>;
            type Err = Traced<database::Error>;

            async fn execute(
                &self,
                Select(by): Select<By<Option<$entity>, $id>>,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(self.state().$field.get(&by.into_inner()).cloned())
            }
        }
    };
}

impl_select_by_id!(Client, client::Id, clients);
impl_select_by_id!(Vehicle, vehicle::Id, vehicles);
impl_select_by_id!(Quote, quote::Id, quotes);
impl_select_by_id!(Invoice, invoice::Id, invoices);

impl Database<Select<By<Vec<Quote>, read::quote::SentBefore>>> for Memory {
    type Ok = Vec<Quote>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Quote>, read::quote::SentBefore>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::quote::SentBefore(deadline) = by.into_inner();
        let mut quotes = self
            .state()
            .quotes
            .values()
            .filter(|q| q.status == quote::Status::Sent)
            .filter(|q| q.sent_at.is_some_and(|at| at < deadline))
            .cloned()
            .collect::<Vec<_>>();
        quotes.sort_by_key(|q| q.sent_at);
        Ok(quotes)
    }
}

impl Database<Select<By<invoice::Number, invoice::CreationDateTime>>>
    for Memory
{
    type Ok = invoice::Number;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<invoice::Number, invoice::CreationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        state.invoice_sequence += 1;
        Ok(invoice::Number::new(2024, state.invoice_sequence))
    }
}

impl Database<Update<Quote>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(quote): Update<Quote>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.broken_quotes.contains(&quote.id) {
            return Err(failure());
        }
        drop(state.quotes.insert(quote.id, quote));
        Ok(())
    }
}

impl Database<Update<Invoice>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(invoice): Update<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().invoices.insert(invoice.id, invoice));
        Ok(())
    }
}

impl Database<Insert<Invoice>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(invoice): Insert<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().invoices.insert(invoice.id, invoice));
        Ok(())
    }
}

impl Database<Insert<Reminder>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reminder): Insert<Reminder>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().reminders.push(reminder);
        Ok(())
    }
}

/// [`Automation`] platform recording the requests it receives.
#[derive(Clone, Debug, Default)]
pub(crate) struct Recorder {
    /// IDs of the [`Quote`]s whose documents were requested.
    pub(crate) generations: Arc<Mutex<Vec<quote::Id>>>,

    /// Received [`SendEmail`] requests.
    pub(crate) emails: Arc<Mutex<Vec<SendEmail>>>,

    /// Indicator whether the [`Webhook::SendEmail`] responds with an error.
    pub(crate) email_fails: bool,
}

impl Recorder {
    /// Returns the number of received [`SendEmail`] requests.
    pub(crate) fn emails_sent(&self) -> usize {
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Automation<Perform<GenerateDocument>> for Recorder {
    type Ok = ();
    type Err = Traced<automation::Error>;

    async fn execute(
        &self,
        Perform(req): Perform<GenerateDocument>,
    ) -> Result<Self::Ok, Self::Err> {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.quote.id);
        Ok(())
    }
}

impl Automation<Perform<SendEmail>> for Recorder {
    type Ok = ();
    type Err = Traced<automation::Error>;

    async fn execute(
        &self,
        Perform(req): Perform<SendEmail>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.email_fails {
            return Err(tracerr::new!(automation::Error::Status {
                webhook: Webhook::SendEmail,
                code: 502,
            }));
        }
        self.emails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req);
        Ok(())
    }
}

/// Creates a new [`Service`] over the provided [`Memory`] database and
/// [`Recorder`] automation platform.
pub(crate) fn service(
    database: Memory,
    automation: Recorder,
) -> Service<Memory, Recorder> {
    Service {
        config: Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
            currency: Currency::Eur,
            document_wait: WaitConfig {
                attempts: 3,
                interval: Duration::from_millis(100),
            },
            follow_up_quotes: task::follow_up_quotes::Config {
                interval: Duration::from_secs(24 * 60 * 60),
                follow_up_after: Duration::from_secs(14 * 24 * 60 * 60),
            },
        },
        database,
        automation,
        completions: Completions::default(),
    }
}

/// Creates a new [`Client`] with the provided email.
pub(crate) fn client(email: Option<&str>) -> Client {
    Client {
        id: client::Id::new(),
        kind: client::Kind::Individual,
        name: client::Name::new("Jeanne Martin").unwrap(),
        email: email.map(|e| contact::Email::new(e).unwrap()),
        phone: None,
        address: None,
        notes: None,
        status: client::Status::Active,
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a new [`Vehicle`] owned by the specified [`Client`].
pub(crate) fn vehicle(client_id: client::Id) -> Vehicle {
    Vehicle {
        id: vehicle::Id::new(),
        client_id,
        plate: vehicle::Plate::new("AB-123-CD").unwrap(),
        make: vehicle::Make::new("Peugeot").unwrap(),
        model: vehicle::Model::new("208").unwrap(),
        year: None,
        mileage: None,
        vin: None,
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a new [`Quote`] in the provided [`quote::Status`].
pub(crate) fn quote(
    client_id: client::Id,
    vehicle_id: vehicle::Id,
    status: quote::Status,
) -> Quote {
    let now = DateTime::now();
    Quote {
        id: quote::Id::new(),
        number: quote::Number::new(2024, 7),
        client_id,
        vehicle_id,
        lines: vec![],
        discount: None,
        currency: Currency::Eur,
        status,
        document_url: None,
        comments: None,
        valid_until: None,
        created_at: now.coerce(),
        updated_at: now.coerce(),
        sent_at: (status == quote::Status::Sent).then(|| now.coerce()),
    }
}

/// Creates a new unpaid [`Invoice`] addressed to the specified [`Client`].
pub(crate) fn invoice(client_id: client::Id) -> Invoice {
    let now = DateTime::now();
    Invoice {
        id: invoice::Id::new(),
        number: invoice::Number::new(2024, 3),
        client_id,
        vehicle_id: None,
        quote_id: None,
        lines: vec![],
        discount: None,
        currency: Currency::Eur,
        due_on: common::Date::today().coerce(),
        payment: None,
        document_url: None,
        comments: None,
        created_at: now.coerce(),
        updated_at: now.coerce(),
    }
}

/// Returns a [`document::Url`] of a generated PDF.
pub(crate) fn pdf(name: &str) -> document::Url {
    document::Url::new(format!("https://cdn.example.com/{name}.pdf")).unwrap()
}
