//! [`Line`] definitions.

use std::str::FromStr;

use common::{define_kind, Currency, Percent};
use derive_more::{Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};
use crate::domain::{catalog, define_text, CatalogItem, Totals};

/// Line item of a [`Quote`] or an [`Invoice`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    /// [`Kind`] of this [`Line`].
    pub kind: Kind,

    /// [`Designation`] of this [`Line`].
    pub designation: Designation,

    /// [`Quantity`] of this [`Line`].
    pub quantity: Quantity,

    /// [`UnitPrice`] of this [`Line`], excluding tax.
    pub unit_price: UnitPrice,

    /// VAT rate printed on this [`Line`].
    pub vat_rate: Percent,

    /// ID of the [`CatalogItem`] this [`Line`] was prefilled from, if any.
    pub catalog_item_id: Option<catalog::Id>,
}

impl Line {
    /// Prefills a new [`Line`] from the provided [`CatalogItem`].
    ///
    /// [`None`] is returned if the [`CatalogItem`] is priced in a different
    /// [`Currency`].
    #[must_use]
    pub fn from_catalog(
        item: &CatalogItem,
        quantity: Quantity,
        currency: Currency,
    ) -> Option<Self> {
        let price = item.sale_price();
        if price.currency != currency {
            return None;
        }

        // SAFETY: `catalog::Label` is a subset of `Designation` format.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let designation =
            unsafe { Designation::new_unchecked(item.label().to_string()) };

        // SAFETY: Prices of catalog items are bounded so their sale price
        //         never exceeds `UnitPrice::MAX`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let unit_price = unsafe { UnitPrice::new_unchecked(price.amount) };

        Some(Self {
            kind: match item.kind() {
                catalog::Kind::Service => Kind::Service,
                catalog::Kind::Part => Kind::Part,
            },
            designation,
            quantity,
            unit_price,
            vat_rate: Totals::STANDARD_VAT,
            catalog_item_id: Some(item.id()),
        })
    }

    /// Returns the total of this [`Line`] excluding tax, being its
    /// [`Quantity`] multiplied by its [`UnitPrice`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.quantity.0 * self.unit_price.0
    }
}

define_kind! {
    #[doc = "Kind of a [`Line`]."]
    enum Kind {
        #[doc = "Labour."]
        Service = 1,

        #[doc = "Spare part."]
        Part = 2,

        #[doc = "Anything else, described in free text."]
        FreeText = 3,
    }
}

define_text! {
    /// Designation of a [`Line`].
    pub struct Designation;
    max_len = 512;
    multiline = true;
}

/// Positive quantity of a [`Line`], not exceeding [`Quantity::MAX`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Quantity(Decimal);

impl Quantity {
    /// [`Quantity`] of a single unit.
    pub const ONE: Self = Self(Decimal::ONE);

    /// Maximum allowed [`Quantity`].
    pub const MAX: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

    /// Creates a new [`Quantity`] if the given `value` is positive and
    /// doesn't exceed [`Quantity::MAX`].
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO && value <= Self::MAX).then_some(Self(value))
    }
}

impl FromStr for Quantity {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Quantity`")
    }
}

/// Non-negative unit price of a [`Line`], excluding tax, not exceeding
/// [`UnitPrice::MAX`].
///
/// Expressed in the [`Currency`] of the document the [`Line`] belongs to.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// Free of charge [`UnitPrice`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Maximum allowed [`UnitPrice`].
    pub const MAX: Decimal =
        Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

    /// Creates a new [`UnitPrice`] if the given `value` is not negative and
    /// doesn't exceed [`UnitPrice::MAX`].
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    /// Creates a new [`UnitPrice`] without checking its bounds.
    ///
    /// # Safety
    ///
    /// Caller must ensure that the provided `value` is within the
    /// `0..=UnitPrice::MAX` range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }
}

impl FromStr for UnitPrice {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `UnitPrice`")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{catalog, Totals};

    use super::{Designation, Kind, Line, Quantity, UnitPrice};

    fn line(qty: &str, price: &str) -> Line {
        Line {
            kind: Kind::FreeText,
            designation: Designation::new("Nettoyage").unwrap(),
            quantity: Quantity::from_str(qty).unwrap(),
            unit_price: UnitPrice::from_str(price).unwrap(),
            vat_rate: Totals::STANDARD_VAT,
            catalog_item_id: None,
        }
    }

    #[test]
    fn total_is_quantity_times_price() {
        assert_eq!(line("2", "10").total(), Decimal::new(20, 0));
        assert_eq!(line("1.5", "33.30").total(), Decimal::new(4995, 2));
        assert_eq!(line("3", "0").total(), Decimal::ZERO);
    }

    #[test]
    fn rejects_non_positive_quantity_and_negative_price() {
        assert!(Quantity::from_str("0").is_err());
        assert!(Quantity::from_str("-1").is_err());
        assert!(Quantity::from_str("abc").is_err());
        assert!(UnitPrice::from_str("-0.01").is_err());
        assert!(UnitPrice::from_str("0").is_ok());
    }

    #[test]
    fn bounds_quantity_and_price() {
        assert!(Quantity::from_str("1000000").is_ok());
        assert!(Quantity::from_str("1000000.01").is_err());
        assert!(
            Quantity::from_str("79228162514264337593543950335").is_err()
        );
        assert!(UnitPrice::from_str("1000000000").is_ok());
        assert!(UnitPrice::from_str("1000000000.01").is_err());

        let largest = line("1000000", "1000000000");
        assert_eq!(largest.total(), Decimal::new(1_000_000_000_000_000, 0));
    }

    #[test]
    fn prefills_from_catalog() {
        let item = catalog::Item::from(catalog::Service {
            id: catalog::Id::new(),
            label: catalog::Label::new("Diagnostic").unwrap(),
            estimated_time: catalog::Hours::from_str("0.5").unwrap(),
            hourly_rate: Money::new(Decimal::new(70, 0), Currency::Eur),
            created_at: DateTime::now().coerce(),
        });

        let line = Line::from_catalog(&item, Quantity::ONE, Currency::Eur)
            .unwrap();
        assert_eq!(line.kind, Kind::Service);
        assert_eq!(line.designation.to_string(), "Diagnostic");
        assert_eq!(line.total(), Decimal::new(35, 0));
        assert_eq!(line.catalog_item_id, Some(item.id()));

        assert!(
            Line::from_catalog(&item, Quantity::ONE, Currency::Usd).is_none()
        );
    }
}
