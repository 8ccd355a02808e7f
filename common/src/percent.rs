//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Decimal percentage in the `0..=100` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// Zero [`Percent`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new whole [`Percent`] in `const` context.
    ///
    /// # Panics
    ///
    /// If the provided `value` is greater than `100`.
    #[expect(clippy::cast_lossless, reason = "`From` is not `const`")]
    #[must_use]
    pub const fn whole(value: u8) -> Self {
        assert!(value <= 100, "`Percent` overflow");
        Self(Decimal::from_parts(value as u32, 0, 0, false, 0))
    }

    /// Creates a new [`Percent`] if the provided value is within the
    /// `0..=100` range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Returns the value of this [`Percent`] in the `0..=100` range.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns this [`Percent`] as a fraction in the `0..=1` range.
    #[must_use]
    pub fn fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Applies this [`Percent`] to the provided `amount`.
    #[must_use]
    pub fn of(self, amount: Decimal) -> Decimal {
        amount * self.0 / Decimal::ONE_HUNDRED
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim_end_matches('%'))
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Decimal percentage in the `0..=100` range, optionally suffixed with
    /// `%`.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Percent = super::Percent;

    impl Percent {
        fn to_output<S: ScalarValue>(p: &Percent) -> Value<S> {
            Value::scalar(p.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Percent` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Percent` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Percent;

    #[test]
    fn bounded_to_hundred() {
        assert!(Percent::new(Decimal::ZERO).is_some());
        assert!(Percent::new(Decimal::ONE_HUNDRED).is_some());
        assert!(Percent::new(Decimal::NEGATIVE_ONE).is_none());
        assert!(Percent::new(Decimal::new(1001, 1)).is_none());
    }

    #[test]
    fn parses_with_optional_sign() {
        assert_eq!(
            Percent::from_str("20").unwrap().value(),
            Decimal::new(20, 0),
        );
        assert_eq!(
            Percent::from_str("12.5%").unwrap().value(),
            Decimal::new(125, 1),
        );
        assert!(Percent::from_str("abc").is_err());
        assert!(Percent::from_str("").is_err());
    }

    #[test]
    fn applies_to_amount() {
        let ten = Percent::from_str("10").unwrap();
        assert_eq!(ten.of(Decimal::new(65, 0)), Decimal::new(65, 1));
        assert_eq!(ten.fraction(), Decimal::new(1, 1));
        assert_eq!(Percent::ZERO.of(Decimal::new(65, 0)), Decimal::ZERO);
    }

    #[test]
    fn whole_matches_parsed() {
        assert_eq!(Percent::whole(20), Percent::from_str("20").unwrap());
        assert_eq!(Percent::whole(0), Percent::ZERO);
    }
}
