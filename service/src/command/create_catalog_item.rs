//! [`Command`] for creating a new [`CatalogItem`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::catalog::{Part, Service as ServiceItem};
use crate::{
    domain::{catalog, CatalogItem},
    infra::{database, Database},
    Service,
};

use super::Command;

/// Pricing of a [`CatalogItem`], defining its kind.
#[derive(Clone, Debug)]
pub enum Pricing {
    /// Labour priced by the hour, making a [`ServiceItem`].
    Service {
        /// Estimated [`catalog::Hours`] of labour.
        estimated_time: catalog::Hours,

        /// Labour rate per hour excluding tax.
        hourly_rate: Money,
    },

    /// Spare part resold with a margin, making a [`Part`].
    Part {
        /// Manufacturer reference of the part.
        reference: Option<catalog::part::Reference>,

        /// Price the part is bought at, excluding tax.
        purchase_price: Money,

        /// [`catalog::Margin`] coefficient applied to the purchase price.
        margin: catalog::Margin,
    },
}

impl Pricing {
    /// Returns the price this [`Pricing`] is based on.
    #[must_use]
    pub fn base_price(&self) -> Money {
        match self {
            Self::Service { hourly_rate, .. } => *hourly_rate,
            Self::Part { purchase_price, .. } => *purchase_price,
        }
    }

    /// Builds a [`CatalogItem`] priced with this [`Pricing`].
    ///
    /// [`None`] is returned if the [`Pricing::base_price()`] is out of the
    /// `0..=catalog::MAX_PRICE` range.
    pub(crate) fn into_item(
        self,
        id: catalog::Id,
        label: catalog::Label,
        created_at: catalog::CreationDateTime,
    ) -> Option<CatalogItem> {
        if !catalog::is_valid_price(self.base_price()) {
            return None;
        }
        Some(match self {
            Self::Service {
                estimated_time,
                hourly_rate,
            } => catalog::Service {
                id,
                label,
                estimated_time,
                hourly_rate,
                created_at,
            }
            .into(),
            Self::Part {
                reference,
                purchase_price,
                margin,
            } => catalog::Part {
                id,
                label,
                reference,
                purchase_price,
                margin,
                created_at,
            }
            .into(),
        })
    }
}

/// [`Command`] for creating a new [`CatalogItem`].
#[derive(Clone, Debug)]
pub struct CreateCatalogItem {
    /// [`catalog::Label`] of a new [`CatalogItem`].
    pub label: catalog::Label,

    /// [`Pricing`] of a new [`CatalogItem`].
    pub pricing: Pricing,
}

impl<Db, Au> Command<CreateCatalogItem> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<CatalogItem>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = CatalogItem;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateCatalogItem,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCatalogItem { label, pricing } = cmd;

        let price = pricing.base_price();
        let item = pricing
            .into_item(catalog::Id::new(), label, DateTime::now().coerce())
            .ok_or(E::PriceOutOfRange(price))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(item)
    }
}

/// Error of [`CreateCatalogItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Price of the [`CatalogItem`] is out of the allowed range.
    #[display("`{_0}` is out of the allowed catalog price range")]
    #[from(ignore)]
    PriceOutOfRange(#[error(not(source))] Money),
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::catalog;

    use super::Pricing;

    #[test]
    fn pricing_defines_kind_and_price() {
        let label = catalog::Label::new("Vidange").unwrap();

        let service = Pricing::Service {
            estimated_time: catalog::Hours::new(Decimal::new(15, 1)).unwrap(),
            hourly_rate: Money::from_str("60EUR").unwrap(),
        }
        .into_item(catalog::Id::new(), label.clone(), DateTime::now().coerce())
        .unwrap();
        assert_eq!(service.kind(), catalog::Kind::Service);
        assert_eq!(service.sale_price().to_string(), "90EUR");

        let part = Pricing::Part {
            reference: None,
            purchase_price: Money::from_str("20EUR").unwrap(),
            margin: catalog::Margin::new(Decimal::new(13, 1)).unwrap(),
        }
        .into_item(catalog::Id::new(), label.clone(), DateTime::now().coerce())
        .unwrap();
        assert_eq!(part.kind(), catalog::Kind::Part);
        assert_eq!(part.sale_price().to_string(), "26EUR");

        let overpriced = Pricing::Service {
            estimated_time: catalog::Hours::new(catalog::Hours::MAX).unwrap(),
            hourly_rate: Money::from_str("1000000.01EUR").unwrap(),
        };
        assert!(overpriced
            .into_item(catalog::Id::new(), label, DateTime::now().coerce())
            .is_none());
    }
}
