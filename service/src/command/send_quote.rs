//! [`Command`] for emailing a [`Quote`] to its [`Client`].

use common::operations::{
    By, Commit, Lock, Perform, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        client,
        document::{Body, Subject},
        quote,
        user::Email,
        Client, Quote,
    },
    infra::{automation, database, Automation, Database},
    Service,
};

use super::Command;

/// [`Command`] for emailing the generated document of a [`Quote`] to its
/// [`Client`], marking the [`Quote`] as [`quote::Status::Sent`].
#[derive(Clone, Debug)]
pub struct SendQuote {
    /// ID of the [`Quote`] to be sent.
    pub quote_id: quote::Id,

    /// [`Email`] to send the [`Quote`] to, if not the [`Client`]'s one.
    pub email: Option<Email>,

    /// [`Subject`] of the email, if not the default one.
    pub subject: Option<Subject>,

    /// [`Body`] of the email, if not the default one.
    pub body: Option<Body>,
}

/// Builds the default email [`Subject`] and [`Body`] for sending the
/// provided [`Quote`] to the given [`Client`].
pub(crate) fn default_email(quote: &Quote, client: &Client) -> (Subject, Body) {
    // SAFETY: `quote::Number` and `client::Name` are single-line and short
    //         enough to fit both formats.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    let email = unsafe {
        (
            Subject::new_unchecked(format!("Devis {}", quote.number)),
            Body::new_unchecked(format!(
                "Bonjour {},\n\n\
                 Veuillez trouver ci-joint notre devis {}.\n\n\
                 Cordialement.",
                client.name, quote.number,
            )),
        )
    };
    email
}

impl<Db, Au> Command<SendQuote> for Service<Db, Au>
where
    Db: Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Quote, quote::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Quote>, quote::Id>>,
            Ok = Option<Quote>,
            Err = Traced<database::Error>,
        > + Database<Update<Quote>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
    Au: Automation<
        Perform<automation::SendEmail>,
        Ok = (),
        Err = Traced<automation::Error>,
    >,
{
    type Ok = Quote;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SendQuote) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendQuote {
            quote_id,
            email,
            subject,
            body,
        } = cmd;

        let quote = self
            .database()
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;
        let document_url = quote
            .document_url
            .clone()
            .ok_or(E::DocumentNotGenerated(quote_id))
            .map_err(tracerr::wrap!())?;
        let client = self
            .database()
            .execute(Select(By::<Option<Client>, _>::new(quote.client_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ClientNotExists(quote.client_id))
            .map_err(tracerr::wrap!())?;
        let email = email
            .or_else(|| client.email.clone())
            .ok_or(E::NoEmail(client.id))
            .map_err(tracerr::wrap!())?;

        let (default_subject, default_body) = default_email(&quote, &client);
        self.automation()
            .execute(Perform(automation::SendEmail {
                quote_id,
                email,
                document_url,
                subject: subject.unwrap_or(default_subject),
                body: body.unwrap_or(default_body),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut quote = tx
            .execute(Select(By::<Option<Quote>, _>::new(quote_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::QuoteNotExists(quote_id))
            .map_err(tracerr::wrap!())?;
        _ = quote.set_status(quote::Status::Sent);

        tx.execute(Update(quote.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(quote)
    }
}

/// Error of [`SendQuote`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Automation`] platform failed to send the email.
    #[display("`Automation` operation failed: {_0}")]
    Automation(automation::Error),

    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    #[from(ignore)]
    ClientNotExists(#[error(not(source))] client::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Quote`] has no generated document to send.
    #[display("`Quote(id: {_0})` has no generated document")]
    #[from(ignore)]
    DocumentNotGenerated(#[error(not(source))] quote::Id),

    /// Neither an [`Email`] is provided, nor the [`Client`] has one.
    #[display("`Client(id: {_0})` has no email")]
    #[from(ignore)]
    NoEmail(#[error(not(source))] client::Id),

    /// [`Quote`] with the provided ID does not exist.
    #[display("`Quote(id: {_0})` does not exist")]
    #[from(ignore)]
    QuoteNotExists(#[error(not(source))] quote::Id),
}

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime};

    use crate::domain::{client, quote, vehicle, Client, Quote};

    use super::default_email;

    #[test]
    fn default_email_mentions_quote_and_client() {
        let now = DateTime::now();
        let client = Client {
            id: client::Id::new(),
            kind: client::Kind::Professional,
            name: client::Name::new("Garage du Centre").unwrap(),
            email: None,
            phone: None,
            address: None,
            notes: None,
            status: client::Status::Active,
            created_at: now.coerce(),
        };
        let quote = Quote {
            id: quote::Id::new(),
            number: quote::Number::new(2024, 7),
            client_id: client.id,
            vehicle_id: vehicle::Id::new(),
            lines: vec![],
            discount: None,
            currency: Currency::Eur,
            status: quote::Status::Generated,
            document_url: None,
            comments: None,
            valid_until: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: None,
        };

        let (subject, body) = default_email(&quote, &client);
        assert_eq!(subject.to_string(), "Devis D-2024-00007");
        assert_eq!(
            body.to_string(),
            "Bonjour Garage du Centre,\n\n\
             Veuillez trouver ci-joint notre devis D-2024-00007.\n\n\
             Cordialement.",
        );
    }
}
