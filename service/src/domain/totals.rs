//! [`Totals`] calculation of [`Quote`]s and [`Invoice`]s.

use std::str::FromStr;

use common::{define_kind, Currency, Money, Percent};
use derive_more::{Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};
use crate::domain::{line, Line};

/// Discount applied to the total of a document excluding tax.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Discount {
    /// Percentage of the total.
    Percent(Percent),

    /// Absolute amount in the document [`Currency`].
    Amount(DiscountAmount),
}

impl Discount {
    /// Returns [`DiscountKind`] of this [`Discount`].
    #[must_use]
    pub fn kind(&self) -> DiscountKind {
        match self {
            Self::Percent(_) => DiscountKind::Percent,
            Self::Amount(_) => DiscountKind::Amount,
        }
    }

    /// Returns the raw value of this [`Discount`].
    #[must_use]
    pub fn value(&self) -> Decimal {
        match self {
            Self::Percent(p) => p.value(),
            Self::Amount(a) => a.0,
        }
    }

    /// Restores a [`Discount`] from its [`DiscountKind`] and raw value.
    ///
    /// [`None`] is returned if the `value` is out of range for the `kind`.
    #[must_use]
    pub fn from_parts(kind: DiscountKind, value: Decimal) -> Option<Self> {
        match kind {
            DiscountKind::Percent => Percent::new(value).map(Self::Percent),
            DiscountKind::Amount => {
                DiscountAmount::new(value).map(Self::Amount)
            }
        }
    }

    /// Returns the amount of this [`Discount`] applied to the provided
    /// `subtotal`.
    ///
    /// The amount is not clamped to the `subtotal`.
    #[must_use]
    pub fn of(&self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Percent(p) => p.of(subtotal),
            Self::Amount(a) => a.0,
        }
    }
}

define_kind! {
    #[doc = "Kind of a [`Discount`]."]
    enum DiscountKind {
        #[doc = "[`Discount::Percent`]."]
        Percent = 1,

        #[doc = "[`Discount::Amount`]."]
        Amount = 2,
    }
}

/// Non-negative absolute [`Discount`] amount, not exceeding
/// [`DiscountAmount::MAX`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct DiscountAmount(Decimal);

impl DiscountAmount {
    /// Maximum allowed [`DiscountAmount`].
    pub const MAX: Decimal = line::UnitPrice::MAX;

    /// Creates a new [`DiscountAmount`] if the given `value` is not
    /// negative and doesn't exceed [`DiscountAmount::MAX`].
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }
}

impl FromStr for DiscountAmount {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `DiscountAmount`")
    }
}

/// Totals of a [`Quote`] or an [`Invoice`].
///
/// Amounts are exact, rounding happens on display only.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Totals {
    /// Sum of [`line::Kind::Service`] lines excluding tax.
    pub services: Money,

    /// Sum of [`line::Kind::Part`] lines excluding tax.
    pub parts: Money,

    /// Sum of [`line::Kind::FreeText`] lines excluding tax.
    pub other: Money,

    /// Sum of all lines excluding tax, before the [`Discount`].
    pub subtotal: Money,

    /// Amount of the applied [`Discount`].
    pub discount: Money,

    /// Total excluding tax after the [`Discount`].
    pub discounted: Money,

    /// Tax amount.
    pub vat: Money,

    /// Grand total including tax.
    pub total: Money,

    /// Tax rate the [`Totals`] were computed with.
    pub vat_rate: Percent,
}

impl Totals {
    /// Value-added tax rate applied to every document.
    pub const STANDARD_VAT: Percent = Percent::whole(20);

    /// Computes [`Totals`] of the provided `lines`.
    #[must_use]
    pub fn compute<'l>(
        lines: impl IntoIterator<Item = &'l Line>,
        discount: Option<Discount>,
        vat_rate: Percent,
        currency: Currency,
    ) -> Self {
        let (mut services, mut parts, mut other) =
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        for line in lines {
            let sum = match line.kind {
                line::Kind::Service => &mut services,
                line::Kind::Part => &mut parts,
                line::Kind::FreeText => &mut other,
            };
            *sum += line.total();
        }

        let subtotal = services + parts + other;
        let discount = discount.map_or(Decimal::ZERO, |d| d.of(subtotal));
        let discounted = subtotal - discount;
        let vat = vat_rate.of(discounted);

        let money = |amount| Money::new(amount, currency);
        Self {
            services: money(services),
            parts: money(parts),
            other: money(other),
            subtotal: money(subtotal),
            discount: money(discount),
            discounted: money(discounted),
            vat: money(vat),
            total: money(discounted + vat),
            vat_rate,
        }
    }

    /// Indicates whether the [`Discount`] is greater than the subtotal, so
    /// the totals went negative.
    #[must_use]
    pub fn discount_exceeds_subtotal(&self) -> bool {
        self.discount.amount > self.subtotal.amount
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Currency, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::{line, Line};

    use super::{Discount, DiscountAmount, DiscountKind, Totals};

    fn line(kind: line::Kind, qty: &str, price: &str) -> Line {
        Line {
            kind,
            designation: line::Designation::new("Ligne").unwrap(),
            quantity: line::Quantity::from_str(qty).unwrap(),
            unit_price: line::UnitPrice::from_str(price).unwrap(),
            vat_rate: Totals::STANDARD_VAT,
            catalog_item_id: None,
        }
    }

    fn eur(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Eur)
    }

    fn percent(s: &str) -> Option<Discount> {
        Some(Discount::Percent(Percent::from_str(s).unwrap()))
    }

    #[test]
    fn computes_reference_example() {
        let lines = [
            line(line::Kind::Service, "1", "45"),
            line(line::Kind::Part, "2", "10"),
        ];

        let totals = Totals::compute(
            &lines,
            percent("10"),
            Totals::STANDARD_VAT,
            Currency::Eur,
        );

        assert_eq!(totals.services, eur("45"));
        assert_eq!(totals.parts, eur("20"));
        assert_eq!(totals.other, eur("0"));
        assert_eq!(totals.subtotal, eur("65"));
        assert_eq!(totals.discount, eur("6.5"));
        assert_eq!(totals.discounted, eur("58.5"));
        assert_eq!(totals.vat, eur("11.7"));
        assert_eq!(totals.total, eur("70.2"));
        assert!(!totals.discount_exceeds_subtotal());
    }

    #[test]
    fn empty_lines_give_zero() {
        let lines: [Line; 0] = [];
        let totals = Totals::compute(
            &lines,
            percent("0"),
            Totals::STANDARD_VAT,
            Currency::Eur,
        );

        for amount in [
            totals.services,
            totals.parts,
            totals.other,
            totals.subtotal,
            totals.discount,
            totals.discounted,
            totals.vat,
            totals.total,
        ] {
            assert_eq!(amount, eur("0"));
        }
    }

    #[test]
    fn zero_priced_lines_give_zero_total() {
        let lines = [
            line(line::Kind::FreeText, "3", "0"),
            line(line::Kind::Service, "0.5", "0"),
        ];

        let totals =
            Totals::compute(&lines, None, Totals::STANDARD_VAT, Currency::Eur);

        assert_eq!(totals.total, eur("0"));
    }

    #[test]
    fn tax_is_rate_of_discounted_total() {
        let prices = ["0", "0.01", "19.99", "45", "1234.56"];
        let quantities = ["0.25", "1", "3", "12.5"];
        let discounts = [None, percent("0"), percent("12.5"), percent("100")];

        for price in prices {
            for qty in quantities {
                for discount in discounts {
                    let lines = [
                        line(line::Kind::Part, qty, price),
                        line(line::Kind::Service, "1", "45"),
                    ];
                    let totals = Totals::compute(
                        &lines,
                        discount,
                        Totals::STANDARD_VAT,
                        Currency::Eur,
                    );

                    let subtotal: Decimal =
                        lines.iter().map(Line::total).sum();
                    assert_eq!(totals.subtotal.amount, subtotal);
                    assert_eq!(
                        totals.discount.amount,
                        discount.map_or(Decimal::ZERO, |d| d.of(subtotal)),
                    );
                    assert_eq!(
                        totals.vat.amount,
                        totals.discounted.amount * Decimal::new(2, 1),
                    );
                    assert_eq!(
                        totals.total.amount,
                        subtotal - totals.discount.amount + totals.vat.amount,
                    );
                }
            }
        }
    }

    #[test]
    fn recomputing_is_idempotent() {
        let lines = [
            line(line::Kind::Service, "1.75", "62"),
            line(line::Kind::FreeText, "1", "15.90"),
        ];
        let discount =
            Some(Discount::Amount(DiscountAmount::from_str("5").unwrap()));
        let compute = || {
            Totals::compute(
                &lines,
                discount,
                Totals::STANDARD_VAT,
                Currency::Eur,
            )
        };

        assert_eq!(compute(), compute());
    }

    #[test]
    fn flags_discount_exceeding_subtotal() {
        let lines = [line(line::Kind::Part, "1", "10")];
        let discount =
            Some(Discount::Amount(DiscountAmount::from_str("15").unwrap()));

        let totals = Totals::compute(
            &lines,
            discount,
            Totals::STANDARD_VAT,
            Currency::Eur,
        );

        assert_eq!(totals.discount, eur("15"));
        assert_eq!(totals.discounted, eur("-5"));
        assert!(totals.discount_exceeds_subtotal());
    }

    #[test]
    fn largest_accepted_input_does_not_overflow() {
        let lines = (0..1000)
            .map(|_| line(line::Kind::Part, "1000000", "1000000000"))
            .collect::<Vec<_>>();
        let discount = Some(Discount::Amount(
            DiscountAmount::new(DiscountAmount::MAX).unwrap(),
        ));

        let totals = Totals::compute(
            &lines,
            discount,
            Totals::STANDARD_VAT,
            Currency::Eur,
        );

        assert_eq!(
            totals.subtotal.amount,
            Decimal::new(1_000_000_000_000_000_000, 0),
        );
        assert_eq!(
            totals.total.amount,
            (totals.subtotal.amount - DiscountAmount::MAX)
                * Decimal::new(12, 1),
        );

        let empty: [Line; 0] = [];
        let totals = Totals::compute(
            &empty,
            discount,
            Totals::STANDARD_VAT,
            Currency::Eur,
        );
        assert!(totals.discount_exceeds_subtotal());
        assert_eq!(
            totals.total.amount,
            -DiscountAmount::MAX * Decimal::new(12, 1),
        );
    }

    #[test]
    fn rejects_out_of_range_discount_amount() {
        assert!(DiscountAmount::from_str("1000000000").is_ok());
        assert!(DiscountAmount::from_str("1000000000.01").is_err());
    }

    #[test]
    fn restores_discount_from_parts() {
        assert_eq!(
            Discount::from_parts(DiscountKind::Percent, Decimal::new(10, 0)),
            percent("10"),
        );
        assert_eq!(
            Discount::from_parts(DiscountKind::Percent, Decimal::new(101, 0)),
            None,
        );
        assert_eq!(
            Discount::from_parts(DiscountKind::Amount, Decimal::NEGATIVE_ONE),
            None,
        );
    }
}
