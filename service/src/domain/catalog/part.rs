//! [`Part`] catalog [`Item`] definition.

use common::Money;
use rust_decimal::Decimal;

#[cfg(doc)]
use super::Item;
use super::{CreationDateTime, Id, Label, Margin};
use crate::domain::define_text;

/// Spare part [`Item`] resold with a [`Margin`].
#[derive(Clone, Debug)]
pub struct Part {
    /// ID of this [`Item`].
    pub id: Id,

    /// [`Label`] of this [`Item`].
    pub label: Label,

    /// Manufacturer [`Reference`] of this [`Part`].
    pub reference: Option<Reference>,

    /// Price this [`Part`] is bought at, excluding tax.
    pub purchase_price: Money,

    /// [`Margin`] coefficient applied to the purchase price.
    pub margin: Margin,

    /// [`DateTime`] when this [`Item`] was created.
    ///
    /// [`DateTime`]: common::DateTime
    pub created_at: CreationDateTime,
}

impl Part {
    /// Returns the sale price of this [`Part`], being its purchase price
    /// multiplied by its [`Margin`].
    #[must_use]
    pub fn sale_price(&self) -> Money {
        self.purchase_price * Decimal::from(self.margin)
    }
}

define_text! {
    /// Manufacturer reference of a [`Part`].
    pub struct Reference;
    max_len = 64;
    multiline = false;
}
