//! [`Webhooks`] client of the automation platform.

use std::time::Duration;

use common::operations::Perform;
use rust_decimal::Decimal;
use serde::Serialize;
use tracerr::Traced;
use tracing as log;

use crate::domain::{client, document, quote, vehicle, Line, Totals};

use super::{Automation, Error, GenerateDocument, SendEmail, Webhook};

/// [`Webhooks`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// URL of the [`Webhook::GenerateDocument`].
    pub generate_document_url: Option<String>,

    /// URL of the [`Webhook::SendEmail`].
    pub send_email_url: Option<String>,

    /// Timeout of a [`Webhook`] call.
    pub timeout: Duration,

    /// Timeout of a [`Webhook::GenerateDocument`] call, overriding the
    /// general one.
    pub generate_document_timeout: Duration,
}

/// HTTP client calling the automation platform webhooks.
#[derive(Clone, Debug)]
pub struct Webhooks {
    /// [`Config`] of these [`Webhooks`].
    config: Config,

    /// Underlying HTTP client.
    http: reqwest::Client,
}

impl Webhooks {
    /// Creates new [`Webhooks`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to initialize the HTTP client.
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!())?;
        Ok(Self { config, http })
    }

    /// Posts the provided JSON `payload` to the specified [`Webhook`].
    async fn post<T: Serialize + ?Sized>(
        &self,
        webhook: Webhook,
        url: Option<&str>,
        timeout: Option<Duration>,
        payload: &T,
    ) -> Result<(), Traced<Error>> {
        let url = url.ok_or(Error::NotConfigured(webhook)).map_err(
            |e| {
                log::warn!("{e}");
                tracerr::new!(e)
            },
        )?;

        let mut req = self.http.post(url).json(payload);
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                tracerr::new!(Error::Timeout(webhook))
            } else {
                tracerr::new!(Error::Transport(e))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(tracerr::new!(Error::Status {
                webhook,
                code: status.as_u16(),
            }));
        }

        log::debug!("`{webhook}` webhook responded with `{status}`");
        Ok(())
    }
}

impl Automation<Perform<GenerateDocument>> for Webhooks {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(req): Perform<GenerateDocument>,
    ) -> Result<Self::Ok, Self::Err> {
        self.post(
            Webhook::GenerateDocument,
            self.config.generate_document_url.as_deref(),
            Some(self.config.generate_document_timeout),
            &DocumentPayload::new(&req),
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

impl Automation<Perform<SendEmail>> for Webhooks {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(req): Perform<SendEmail>,
    ) -> Result<Self::Ok, Self::Err> {
        let SendEmail {
            quote_id,
            email,
            document_url,
            subject,
            body,
        } = &req;

        self.post(
            Webhook::SendEmail,
            self.config.send_email_url.as_deref(),
            None,
            &EmailPayload {
                devis_id: *quote_id,
                email: email.as_ref(),
                pdf_url: document_url,
                subject: subject.as_ref(),
                body: body.as_ref(),
            },
        )
        .await
        .map_err(tracerr::wrap!())
    }
}

/// JSON payload of the [`Webhook::SendEmail`].
#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    /// ID of the sent quote.
    devis_id: quote::Id,

    /// Recipient address.
    email: &'a str,

    /// URL of the attached PDF.
    pdf_url: &'a document::Url,

    /// Subject of the email.
    subject: &'a str,

    /// Body of the email.
    body: &'a str,
}

/// JSON payload of the [`Webhook::GenerateDocument`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentPayload<'a> {
    /// ID of the quote.
    devis_id: quote::Id,

    /// Human-readable number of the quote.
    numero_devis: &'a quote::Number,

    /// Client the quote is addressed to.
    client: ClientPayload<'a>,

    /// Vehicle the quote is about.
    vehicule: VehiclePayload<'a>,

    /// Lines of the quote.
    lignes: Vec<LinePayload<'a>>,

    /// Totals of the quote.
    totaux: TotalsPayload,

    /// Comments printed on the quote.
    commentaires: Option<&'a str>,
}

impl<'a> DocumentPayload<'a> {
    /// Builds a new [`DocumentPayload`] out of the provided
    /// [`GenerateDocument`] request.
    fn new(req: &'a GenerateDocument) -> Self {
        let GenerateDocument {
            quote,
            client,
            vehicle,
        } = req;

        Self {
            devis_id: quote.id,
            numero_devis: &quote.number,
            client: ClientPayload {
                id: client.id,
                nom: client.name.as_ref(),
                email: client.email.as_ref().map(AsRef::as_ref),
                telephone: client.phone.as_ref().map(AsRef::as_ref),
                adresse: client.address.as_ref().map(AsRef::as_ref),
            },
            vehicule: VehiclePayload {
                id: vehicle.id,
                immatriculation: vehicle.plate.as_ref(),
                marque: vehicle.make.as_ref(),
                modele: vehicle.model.as_ref(),
                annee: vehicle.year.map(u16::from),
                kilometrage: vehicle.mileage.map(u32::from),
                vin: vehicle.vin.as_ref().map(AsRef::as_ref),
            },
            lignes: quote.lines.iter().map(LinePayload::new).collect(),
            totaux: TotalsPayload::new(&quote.totals()),
            commentaires: quote.comments.as_ref().map(AsRef::as_ref),
        }
    }
}

/// Client part of a [`DocumentPayload`].
#[derive(Debug, Serialize)]
struct ClientPayload<'a> {
    /// ID of the client.
    id: client::Id,

    /// Name of the client.
    nom: &'a str,

    /// Email of the client.
    email: Option<&'a str>,

    /// Phone of the client.
    telephone: Option<&'a str>,

    /// Postal address of the client.
    adresse: Option<&'a str>,
}

/// Vehicle part of a [`DocumentPayload`].
#[derive(Debug, Serialize)]
struct VehiclePayload<'a> {
    /// ID of the vehicle.
    id: vehicle::Id,

    /// Registration plate.
    immatriculation: &'a str,

    /// Manufacturer.
    marque: &'a str,

    /// Model.
    modele: &'a str,

    /// Model year.
    annee: Option<u16>,

    /// Odometer reading in km.
    kilometrage: Option<u32>,

    /// Vehicle identification number.
    vin: Option<&'a str>,
}

/// Line part of a [`DocumentPayload`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LinePayload<'a> {
    /// Kind of the line.
    #[serde(rename = "type")]
    kind: String,

    /// Designation of the line.
    designation: &'a str,

    /// Quantity.
    #[serde(with = "rust_decimal::serde::float")]
    quantite: Decimal,

    /// Unit price excluding tax.
    #[serde(rename = "prixUnitaireHT", with = "rust_decimal::serde::float")]
    prix_unitaire_ht: Decimal,

    /// VAT rate in percents.
    #[serde(rename = "tauxTVA", with = "rust_decimal::serde::float")]
    taux_tva: Decimal,

    /// Line total excluding tax.
    #[serde(rename = "totalHT", with = "rust_decimal::serde::float")]
    total_ht: Decimal,
}

impl<'a> LinePayload<'a> {
    /// Builds a new [`LinePayload`] out of the provided [`Line`].
    fn new(line: &'a Line) -> Self {
        Self {
            kind: line.kind.to_string(),
            designation: line.designation.as_ref(),
            quantite: line.quantity.into(),
            prix_unitaire_ht: line.unit_price.into(),
            taux_tva: line.vat_rate.value(),
            total_ht: line.total(),
        }
    }
}

/// Totals part of a [`DocumentPayload`].
#[derive(Debug, Serialize)]
struct TotalsPayload {
    /// Sum of the service lines excluding tax.
    #[serde(rename = "totalServices", with = "rust_decimal::serde::float")]
    services: Decimal,

    /// Sum of the part lines excluding tax.
    #[serde(rename = "totalPieces", with = "rust_decimal::serde::float")]
    parts: Decimal,

    /// Sum of the free text lines excluding tax.
    #[serde(rename = "totalAutres", with = "rust_decimal::serde::float")]
    other: Decimal,

    /// Total excluding tax before the discount.
    #[serde(rename = "totalHT", with = "rust_decimal::serde::float")]
    subtotal: Decimal,

    /// Discount amount.
    #[serde(rename = "remise", with = "rust_decimal::serde::float")]
    discount: Decimal,

    /// Total excluding tax after the discount.
    #[serde(rename = "totalHTRemise", with = "rust_decimal::serde::float")]
    discounted: Decimal,

    /// Tax amount.
    #[serde(rename = "tva", with = "rust_decimal::serde::float")]
    vat: Decimal,

    /// Grand total including tax.
    #[serde(rename = "totalTTC", with = "rust_decimal::serde::float")]
    total: Decimal,

    /// Currency of all the amounts.
    #[serde(rename = "devise")]
    currency: String,
}

impl TotalsPayload {
    /// Builds a new [`TotalsPayload`] out of the provided [`Totals`].
    fn new(totals: &Totals) -> Self {
        let round = |m: common::Money| m.rounded().amount;
        Self {
            services: round(totals.services),
            parts: round(totals.parts),
            other: round(totals.other),
            subtotal: round(totals.subtotal),
            discount: round(totals.discount),
            discounted: round(totals.discounted),
            vat: round(totals.vat),
            total: round(totals.total),
            currency: totals.total.currency.to_string(),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{operations::Perform, Currency, DateTime};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        domain::{
            client, document, line, quote, user::Email, vehicle, Client,
            Line, Quote, Totals, Vehicle,
        },
        infra::automation::{
            Automation as _, Error, GenerateDocument, SendEmail, Webhook,
        },
    };

    use super::{Config, Webhooks};

    fn webhooks(server: Option<&MockServer>) -> Webhooks {
        let url = |p: &str| server.map(|s| format!("{}{p}", s.uri()));
        Webhooks::new(Config {
            generate_document_url: url("/generate"),
            send_email_url: url("/email"),
            timeout: Duration::from_secs(5),
            generate_document_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn request() -> GenerateDocument {
        let now = DateTime::now();
        let client = Client {
            id: client::Id::new(),
            kind: client::Kind::Individual,
            name: client::Name::new("Jean Dupont").unwrap(),
            email: Email::new("jean@example.com"),
            phone: None,
            address: None,
            notes: None,
            status: client::Status::Active,
            created_at: now.coerce(),
        };
        let vehicle = Vehicle {
            id: vehicle::Id::new(),
            client_id: client.id,
            plate: vehicle::Plate::new("ab-123-cd").unwrap(),
            make: vehicle::Make::new("Renault").unwrap(),
            model: vehicle::Model::new("Clio").unwrap(),
            year: vehicle::Year::new(2018),
            mileage: vehicle::Mileage::new(84_000),
            vin: None,
            created_at: now.coerce(),
        };
        let quote = Quote {
            id: quote::Id::new(),
            number: quote::Number::new(2024, 42),
            client_id: client.id,
            vehicle_id: vehicle.id,
            lines: vec![Line {
                kind: line::Kind::Service,
                designation: line::Designation::new("Vidange").unwrap(),
                quantity: line::Quantity::from_str("2").unwrap(),
                unit_price: line::UnitPrice::from_str("45.50").unwrap(),
                vat_rate: Totals::STANDARD_VAT,
                catalog_item_id: None,
            }],
            discount: None,
            currency: Currency::Eur,
            status: quote::Status::Draft,
            document_url: None,
            comments: None,
            valid_until: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            sent_at: None,
        };
        GenerateDocument {
            quote,
            client,
            vehicle,
        }
    }

    #[tokio::test]
    async fn posts_document_payload() {
        let server = MockServer::start().await;
        let req = request();
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_json(json!({
                "devisId": req.quote.id,
                "numeroDevis": "D-2024-00042",
                "client": {
                    "id": req.client.id,
                    "nom": "Jean Dupont",
                    "email": "jean@example.com",
                    "telephone": null,
                    "adresse": null,
                },
                "vehicule": {
                    "id": req.vehicle.id,
                    "immatriculation": "AB-123-CD",
                    "marque": "Renault",
                    "modele": "Clio",
                    "annee": 2018,
                    "kilometrage": 84000,
                    "vin": null,
                },
                "lignes": [{
                    "type": "SERVICE",
                    "designation": "Vidange",
                    "quantite": 2.0,
                    "prixUnitaireHT": 45.5,
                    "tauxTVA": 20.0,
                    "totalHT": 91.0,
                }],
                "totaux": {
                    "totalServices": 91.0,
                    "totalPieces": 0.0,
                    "totalAutres": 0.0,
                    "totalHT": 91.0,
                    "remise": 0.0,
                    "totalHTRemise": 91.0,
                    "tva": 18.2,
                    "totalTTC": 109.2,
                    "devise": "EUR",
                },
                "commentaires": null,
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        webhooks(Some(&server)).execute(Perform(req)).await.unwrap();
    }

    #[tokio::test]
    async fn posts_email_payload() {
        let server = MockServer::start().await;
        let quote_id = quote::Id::new();
        Mock::given(method("POST"))
            .and(path("/email"))
            .and(body_json(json!({
                "devis_id": quote_id,
                "email": "jean@example.com",
                "pdf_url": "https://cdn.example.com/d.pdf",
                "subject": "Devis D-2024-00042",
                "body": "Bonjour",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        webhooks(Some(&server))
            .execute(Perform(SendEmail {
                quote_id,
                email: Email::new("jean@example.com").unwrap(),
                document_url: document::Url::new(
                    "https://cdn.example.com/d.pdf",
                )
                .unwrap(),
                subject: document::Subject::new("Devis D-2024-00042")
                    .unwrap(),
                body: document::Body::new("Bonjour").unwrap(),
            }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn maps_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = webhooks(Some(&server))
            .execute(Perform(request()))
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            Error::Status {
                webhook: Webhook::GenerateDocument,
                code: 500,
            },
        ));
    }

    #[tokio::test]
    async fn reports_unset_url() {
        let err = webhooks(None)
            .execute(Perform(request()))
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            Error::NotConfigured(Webhook::GenerateDocument),
        ));
    }
}
