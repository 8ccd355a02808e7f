//! Definitions shared by `Quote` and `Invoice` documents.

use common::{Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
};
use service::{command::LineDraft, domain};

use crate::{
    api::{self, scalar, CatalogItem},
    Context,
};

/// Line of a `Quote` or an `Invoice`.
#[derive(Clone, Debug, From)]
pub struct Line(domain::Line);

/// Line of a `Quote` or an `Invoice`.
#[graphql_object(context = Context)]
impl Line {
    /// Kind of this `Line`.
    #[must_use]
    pub fn kind(&self) -> LineKind {
        self.0.kind.into()
    }

    /// Designation of this `Line`.
    #[must_use]
    pub fn designation(&self) -> Designation {
        self.0.designation.clone().into()
    }

    /// Quantity of this `Line`.
    #[must_use]
    pub fn quantity(&self) -> Quantity {
        self.0.quantity.into()
    }

    /// Price of a unit, excluding VAT.
    #[must_use]
    pub fn unit_price(&self) -> UnitPrice {
        self.0.unit_price.into()
    }

    /// VAT rate printed on this `Line`.
    #[must_use]
    pub fn vat_rate(&self) -> Percent {
        self.0.vat_rate
    }

    /// `CatalogItem` this `Line` was prefilled from, if any.
    #[must_use]
    pub fn catalog_item(&self) -> Option<CatalogItem> {
        self.0.catalog_item_id.map(|id| {
            #[expect(
                unsafe_code,
                reason = "deleted items are detached from lines"
            )]
            let item = unsafe { CatalogItem::new_unchecked(id) };
            item
        })
    }
}

/// Line to put into a `Quote` or an `Invoice`.
///
/// Either references a `CatalogItem` to prefill the line from, or describes
/// it with a `kind`, a `designation` and a `unitPrice`.
#[derive(Clone, Debug, GraphQLInputObject)]
pub struct LineInput {
    /// `CatalogItem` to prefill the line from.
    pub catalog_item_id: Option<api::catalog::Id>,

    /// Kind of the line.
    pub kind: Option<LineKind>,

    /// Designation of the line.
    pub designation: Option<Designation>,

    /// Quantity of the line, defaulting to 1.
    pub quantity: Option<Quantity>,

    /// Price of a unit, excluding VAT.
    ///
    /// Defaults to zero for `FREE_TEXT` lines only.
    pub unit_price: Option<UnitPrice>,

    /// VAT rate printed on the line, defaulting to the standard one.
    pub vat_rate: Option<Percent>,
}

impl TryFrom<LineInput> for LineDraft {
    type Error = api::InputError;

    fn try_from(input: LineInput) -> Result<Self, Self::Error> {
        let LineInput {
            catalog_item_id,
            kind,
            designation,
            quantity,
            unit_price,
            vat_rate,
        } = input;
        let quantity = quantity.map_or(domain::line::Quantity::ONE, Into::into);

        if let Some(id) = catalog_item_id {
            if kind.is_some()
                || designation.is_some()
                || unit_price.is_some()
                || vat_rate.is_some()
            {
                return Err(api::InputError::Line);
            }
            return Ok(Self::Catalog {
                item_id: id.into(),
                quantity,
            });
        }

        let (Some(kind), Some(designation)) = (kind, designation) else {
            return Err(api::InputError::Line);
        };
        let unit_price = match (kind, unit_price) {
            (_, Some(price)) => price.into(),
            (LineKind::FreeText, None) => domain::line::UnitPrice::ZERO,
            (LineKind::Service | LineKind::Part, None) => {
                return Err(api::InputError::Line);
            }
        };
        Ok(Self::Free {
            kind: kind.into(),
            designation: designation.into(),
            quantity,
            unit_price,
            vat_rate,
        })
    }
}

/// Converts the provided [`LineInput`]s into [`LineDraft`]s.
///
/// # Errors
///
/// If any of the [`LineInput`]s is invalid.
pub(crate) fn line_drafts(
    lines: Vec<LineInput>,
) -> Result<Vec<LineDraft>, api::InputError> {
    lines.into_iter().map(TryInto::try_into).collect()
}

/// Kind of a `Line`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum LineKind {
    /// Labour.
    Service,

    /// Spare part.
    Part,

    /// Anything else, described in free text.
    FreeText,
}

impl From<domain::line::Kind> for LineKind {
    fn from(kind: domain::line::Kind) -> Self {
        use domain::line::Kind as K;
        match kind {
            K::Service => Self::Service,
            K::Part => Self::Part,
            K::FreeText => Self::FreeText,
        }
    }
}

impl From<LineKind> for domain::line::Kind {
    fn from(kind: LineKind) -> Self {
        match kind {
            LineKind::Service => Self::Service,
            LineKind::Part => Self::Part,
            LineKind::FreeText => Self::FreeText,
        }
    }
}

/// Designation of a `Line`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "LineDesignation",
    with = scalar::Via::<domain::line::Designation>,
)]
pub struct Designation(domain::line::Designation);

/// Positive decimal quantity of a `Line`.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "LineQuantity",
    with = scalar::Via::<domain::line::Quantity>,
)]
pub struct Quantity(domain::line::Quantity);

/// Non-negative decimal price of a `Line` unit, excluding VAT.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "LineUnitPrice",
    with = scalar::Via::<domain::line::UnitPrice>,
)]
pub struct UnitPrice(domain::line::UnitPrice);

/// Discount applied to the subtotal of a `Quote` or an `Invoice`.
#[derive(Clone, Copy, Debug, From)]
pub struct Discount(domain::totals::Discount);

/// Discount applied to the subtotal of a `Quote` or an `Invoice`.
#[graphql_object(context = Context)]
impl Discount {
    /// Kind of this `Discount`.
    #[must_use]
    pub fn kind(&self) -> DiscountKind {
        self.0.kind().into()
    }

    /// Percentage of the subtotal, if this is a `PERCENT` discount.
    #[must_use]
    pub fn percent(&self) -> Option<Percent> {
        match self.0 {
            domain::totals::Discount::Percent(p) => Some(p),
            domain::totals::Discount::Amount(_) => None,
        }
    }

    /// Fixed amount, if this is an `AMOUNT` discount.
    #[must_use]
    pub fn amount(&self) -> Option<DiscountAmount> {
        match self.0 {
            domain::totals::Discount::Amount(a) => Some(a.into()),
            domain::totals::Discount::Percent(_) => None,
        }
    }
}

/// Discount to apply to the subtotal of a `Quote` or an `Invoice`.
///
/// Exactly one of the fields must be set.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
pub struct DiscountInput {
    /// Percentage of the subtotal.
    pub percent: Option<Percent>,

    /// Fixed amount in the document currency.
    pub amount: Option<DiscountAmount>,
}

impl TryFrom<DiscountInput> for domain::totals::Discount {
    type Error = api::InputError;

    fn try_from(input: DiscountInput) -> Result<Self, Self::Error> {
        match (input.percent, input.amount) {
            (Some(p), None) => Ok(Self::Percent(p)),
            (None, Some(a)) => Ok(Self::Amount(a.into())),
            (Some(_), Some(_)) | (None, None) => Err(api::InputError::Discount),
        }
    }
}

/// Converts the provided optional [`DiscountInput`].
///
/// # Errors
///
/// If the [`DiscountInput`] is invalid.
pub(crate) fn discount(
    input: Option<DiscountInput>,
) -> Result<Option<domain::totals::Discount>, api::InputError> {
    input.map(TryInto::try_into).transpose()
}

/// Kind of a `Discount`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum DiscountKind {
    /// Percentage of the subtotal.
    Percent,

    /// Fixed amount.
    Amount,
}

impl From<domain::totals::DiscountKind> for DiscountKind {
    fn from(kind: domain::totals::DiscountKind) -> Self {
        use domain::totals::DiscountKind as K;
        match kind {
            K::Percent => Self::Percent,
            K::Amount => Self::Amount,
        }
    }
}

/// Non-negative decimal amount of a `Discount`.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DiscountAmount",
    with = scalar::Via::<domain::totals::DiscountAmount>,
)]
pub struct DiscountAmount(domain::totals::DiscountAmount);

/// Totals of a `Quote` or an `Invoice`.
#[derive(Clone, Copy, Debug, From)]
pub struct Totals(domain::Totals);

/// Totals of a `Quote` or an `Invoice`, rounded to minor units.
#[graphql_object(context = Context)]
impl Totals {
    /// Sum of the `SERVICE` lines.
    #[must_use]
    pub fn services(&self) -> Money {
        self.0.services.rounded()
    }

    /// Sum of the `PART` lines.
    #[must_use]
    pub fn parts(&self) -> Money {
        self.0.parts.rounded()
    }

    /// Sum of the `FREE_TEXT` lines.
    #[must_use]
    pub fn other(&self) -> Money {
        self.0.other.rounded()
    }

    /// Sum of all the lines, excluding VAT.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.0.subtotal.rounded()
    }

    /// Discounted amount.
    #[must_use]
    pub fn discount(&self) -> Money {
        self.0.discount.rounded()
    }

    /// Subtotal after the discount, excluding VAT.
    #[must_use]
    pub fn discounted(&self) -> Money {
        self.0.discounted.rounded()
    }

    /// VAT amount.
    #[must_use]
    pub fn vat(&self) -> Money {
        self.0.vat.rounded()
    }

    /// Total amount to pay, including VAT.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total.rounded()
    }

    /// VAT rate applied to the discounted subtotal.
    #[must_use]
    pub fn vat_rate(&self) -> Percent {
        self.0.vat_rate
    }

    /// Indicator whether the discount exceeds the subtotal, making the
    /// total negative.
    #[must_use]
    pub fn discount_exceeds_subtotal(&self) -> bool {
        self.0.discount_exceeds_subtotal()
    }
}

/// Currency of a `Quote` or an `Invoice`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
pub enum Currency {
    /// Euro.
    Eur,

    /// Swiss Franc.
    Chf,

    /// Pound Sterling.
    Gbp,

    /// US Dollar.
    Usd,
}

impl From<common::Currency> for Currency {
    fn from(currency: common::Currency) -> Self {
        use common::Currency as C;
        match currency {
            C::Eur => Self::Eur,
            C::Chf => Self::Chf,
            C::Gbp => Self::Gbp,
            C::Usd => Self::Usd,
        }
    }
}

impl From<Currency> for common::Currency {
    fn from(currency: Currency) -> Self {
        match currency {
            Currency::Eur => Self::Eur,
            Currency::Chf => Self::Chf,
            Currency::Gbp => Self::Gbp,
            Currency::Usd => Self::Usd,
        }
    }
}

/// Free-text comments printed on a `Quote` or an `Invoice`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DocumentComments",
    with = scalar::Via::<domain::document::Comments>,
)]
pub struct Comments(domain::document::Comments);

/// URL of a generated PDF document.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "DocumentUrl",
    with = scalar::Via::<domain::document::Url>,
)]
pub struct Url(domain::document::Url);

/// Subject of an email.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "EmailSubject",
    with = scalar::Via::<domain::document::Subject>,
)]
pub struct Subject(domain::document::Subject);

/// Body of an email.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "EmailBody",
    with = scalar::Via::<domain::document::Body>,
)]
pub struct Body(domain::document::Body);

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Percent;
    use service::{command::LineDraft, domain};
    use uuid::Uuid;

    use super::{
        discount, line_drafts, DiscountInput, LineInput, LineKind,
    };

    fn free(kind: LineKind, price: Option<&str>) -> LineInput {
        LineInput {
            catalog_item_id: None,
            kind: Some(kind),
            designation: Some(
                domain::line::Designation::new("Oil change")
                    .unwrap()
                    .into(),
            ),
            quantity: None,
            unit_price: price.map(|p| {
                domain::line::UnitPrice::from_str(p).unwrap().into()
            }),
            vat_rate: None,
        }
    }

    #[test]
    fn converts_catalog_line() {
        let id = domain::catalog::Id::from(Uuid::new_v4());
        let input = LineInput {
            catalog_item_id: Some(id.into()),
            kind: None,
            designation: None,
            quantity: None,
            unit_price: None,
            vat_rate: None,
        };

        let drafts = line_drafts(vec![input]).unwrap();
        assert!(matches!(
            drafts.as_slice(),
            [LineDraft::Catalog { item_id, quantity }]
                if *item_id == id
                    && *quantity == domain::line::Quantity::ONE,
        ));
    }

    #[test]
    fn rejects_mixed_catalog_line() {
        let mut input = free(LineKind::Part, Some("10"));
        input.catalog_item_id =
            Some(domain::catalog::Id::from(Uuid::new_v4()).into());

        assert!(line_drafts(vec![input]).is_err());
    }

    #[test]
    fn requires_price_of_priced_lines() {
        assert!(line_drafts(vec![free(LineKind::Service, None)]).is_err());
        assert!(line_drafts(vec![free(LineKind::Service, Some("45"))]).is_ok());

        let drafts = line_drafts(vec![free(LineKind::FreeText, None)]).unwrap();
        assert!(matches!(
            drafts.as_slice(),
            [LineDraft::Free { unit_price, .. }]
                if *unit_price == domain::line::UnitPrice::ZERO,
        ));
    }

    #[test]
    fn discount_needs_exactly_one_value() {
        let ten = Percent::from_str("10").unwrap();
        let amount = domain::totals::DiscountAmount::from_str("5").unwrap();

        assert_eq!(
            discount(Some(DiscountInput {
                percent: Some(ten),
                amount: None,
            }))
            .unwrap(),
            Some(domain::totals::Discount::Percent(ten)),
        );
        assert_eq!(
            discount(Some(DiscountInput {
                percent: None,
                amount: Some(amount.into()),
            }))
            .unwrap(),
            Some(domain::totals::Discount::Amount(amount)),
        );
        assert!(discount(Some(DiscountInput {
            percent: Some(ten),
            amount: Some(amount.into()),
        }))
        .is_err());
        assert!(discount(Some(DiscountInput {
            percent: None,
            amount: None,
        }))
        .is_err());
        assert_eq!(discount(None).unwrap(), None);
    }
}
