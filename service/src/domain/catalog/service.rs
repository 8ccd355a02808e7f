//! [`Service`] catalog [`Item`] definition.

use common::Money;
use rust_decimal::Decimal;

#[cfg(doc)]
use super::Item;
use super::{CreationDateTime, Hours, Id, Label};

/// Labour [`Item`] priced by the hour.
#[derive(Clone, Debug)]
pub struct Service {
    /// ID of this [`Item`].
    pub id: Id,

    /// [`Label`] of this [`Item`].
    pub label: Label,

    /// Estimated [`Hours`] of labour.
    pub estimated_time: Hours,

    /// Labour rate per hour excluding tax.
    pub hourly_rate: Money,

    /// [`DateTime`] when this [`Item`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

impl Service {
    /// Returns the sale price of this [`Service`], being its estimated time
    /// multiplied by its hourly rate.
    #[must_use]
    pub fn sale_price(&self) -> Money {
        self.hourly_rate * Decimal::from(self.estimated_time)
    }
}
