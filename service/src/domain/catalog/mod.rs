//! Catalog [`Item`] definitions.

pub mod part;
pub mod service;

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::Line;
use crate::domain::{define_id, define_text};

pub use self::{part::Part, service::Service};

/// Reusable catalog entry prefilling [`Line`]s.
#[derive(Clone, Debug, From)]
pub enum Item {
    #[doc(hidden)]
    Service(Service),
    #[doc(hidden)]
    Part(Part),
}

impl Item {
    /// Returns ID of this [`Item`].
    #[must_use]
    pub fn id(&self) -> Id {
        match self {
            Self::Service(s) => s.id,
            Self::Part(p) => p.id,
        }
    }

    /// Returns [`Kind`] of this [`Item`].
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Service(_) => Kind::Service,
            Self::Part(_) => Kind::Part,
        }
    }

    /// Returns [`Label`] of this [`Item`].
    #[must_use]
    pub fn label(&self) -> &Label {
        match self {
            Self::Service(s) => &s.label,
            Self::Part(p) => &p.label,
        }
    }

    /// Returns the sale price of this [`Item`] excluding tax.
    #[must_use]
    pub fn sale_price(&self) -> Money {
        match self {
            Self::Service(s) => s.sale_price(),
            Self::Part(p) => p.sale_price(),
        }
    }

    /// Returns [`DateTime`] when this [`Item`] was created.
    #[must_use]
    pub fn created_at(&self) -> CreationDateTime {
        match self {
            Self::Service(s) => s.created_at,
            Self::Part(p) => p.created_at,
        }
    }
}

define_id! {
    /// ID of a catalog [`Item`].
    pub struct Id;
}

define_text! {
    /// Label of a catalog [`Item`], used as a [`Line`] designation.
    pub struct Label;
    max_len = 256;
    multiline = false;
}

define_kind! {
    #[doc = "Kind of a catalog [`Item`]."]
    enum Kind {
        #[doc = "Labour [`Service`]."]
        Service = 1,

        #[doc = "Spare [`Part`]."]
        Part = 2,
    }
}

/// Estimated labour time in hours.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Hours(Decimal);

impl Hours {
    /// Maximum [`Hours`] a single [`Service`] may take.
    pub const MAX: Decimal = Decimal::ONE_THOUSAND;

    /// Creates new [`Hours`] if the given `value` is positive and doesn't
    /// exceed [`Hours::MAX`].
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (value > Decimal::ZERO && value <= Self::MAX).then_some(Self(value))
    }
}

impl FromStr for Hours {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Hours`")
    }
}

/// Coefficient applied to a [`Part`] purchase price to get its sale price.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Margin(Decimal);

impl Margin {
    /// Neutral [`Margin`] selling a [`Part`] at its purchase price.
    pub const NONE: Self = Self(Decimal::ONE);

    /// Maximum allowed [`Margin`].
    pub const MAX: Decimal = Decimal::ONE_HUNDRED;

    /// Creates a new [`Margin`] if the given `value` is within the
    /// `1..=100` range.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        (Decimal::ONE..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::NONE
    }
}

impl FromStr for Margin {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Margin`")
    }
}

/// Maximum hourly rate of a [`Service`] or purchase price of a [`Part`].
///
/// Keeps every sale price within [`UnitPrice::MAX`].
///
/// [`UnitPrice::MAX`]: crate::domain::line::UnitPrice::MAX
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Checks whether the provided `price` is allowed as an hourly rate of a
/// [`Service`] or a purchase price of a [`Part`].
#[must_use]
pub fn is_valid_price(price: Money) -> bool {
    (Decimal::ZERO..=MAX_PRICE).contains(&price.amount)
}

/// [`DateTime`] when a catalog [`Item`] was created.
pub type CreationDateTime = DateTimeOf<(Item, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use super::{Hours, Item, Kind, Label, Margin, Part, Service};

    fn eur(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Eur)
    }

    #[test]
    fn service_price_is_hours_times_rate() {
        let item = Item::from(Service {
            id: super::Id::new(),
            label: Label::new("Vidange").unwrap(),
            estimated_time: Hours::from_str("1.5").unwrap(),
            hourly_rate: eur("60"),
            created_at: DateTime::now().coerce(),
        });

        assert_eq!(item.kind(), Kind::Service);
        assert_eq!(item.sale_price(), eur("90"));
    }

    #[test]
    fn part_price_is_purchase_times_margin() {
        let item = Item::from(Part {
            id: super::Id::new(),
            label: Label::new("Filtre à huile").unwrap(),
            reference: None,
            purchase_price: eur("12.40"),
            margin: Margin::from_str("1.35").unwrap(),
            created_at: DateTime::now().coerce(),
        });

        assert_eq!(item.kind(), Kind::Part);
        assert_eq!(item.sale_price(), eur("16.74"));
    }

    #[test]
    fn bounds_hours_and_margin() {
        assert!(Hours::new(Decimal::ZERO).is_none());
        assert!(Hours::new(Decimal::new(25, 2)).is_some());
        assert!(Margin::new(Decimal::new(99, 2)).is_none());
        assert!(Margin::new(Decimal::ONE).is_some());
        assert!(Margin::from_str("abc").is_err());
    }

    #[test]
    fn bounds_prices() {
        assert!(super::is_valid_price(eur("0")));
        assert!(super::is_valid_price(eur("1000000")));
        assert!(!super::is_valid_price(eur("1000000.01")));
        assert!(!super::is_valid_price(eur("-1")));
    }
}
