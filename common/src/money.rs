//! [`Money`]-related definitions.

use std::{fmt, ops, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Number of minor units digits every [`Currency`] is displayed with.
    pub const MINOR_DIGITS: u32 = 2;

    /// Creates a new [`Money`] amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Rounds this [`Money`] to its minor units, half away from zero.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                Self::MINOR_DIGITS,
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency: self.currency,
        }
    }

    /// Adds the `other` [`Money`] to this one.
    ///
    /// [`None`] is returned if the currencies differ.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        (self.currency == other.currency)
            .then(|| Self::new(self.amount + other.amount, self.currency))
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self::new(self.amount * rhs, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self.rounded();
        if amount.fract().is_zero() {
            write!(f, "{}{currency}", amount.trunc().normalize())
        } else {
            write!(f, "{amount:.2}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_char_boundary(s.len() - 3) {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Euro."]
        Eur = 1,

        #[doc = "Swiss Franc."]
        Chf = 2,

        #[doc = "Pound Sterling."]
        Gbp = 3,

        #[doc = "US Dollar."]
        Usd = 4,
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::Eur
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn eur(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Eur)
    }

    #[test]
    fn from_str() {
        assert_eq!(Money::from_str("123.45EUR").unwrap(), eur("123.45"));
        assert_eq!(
            Money::from_str("0.5CHF").unwrap(),
            Money::new(Decimal::new(5, 1), Currency::Chf),
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Eu").is_err());
        assert!(Money::from_str("123.45Euros").is_err());
        assert!(Money::from_str("abcEUR").is_err());
        assert!(Money::from_str("12€").is_err());

        assert!(Money::from_str("123.00EUR").is_ok());
        assert!(Money::from_str("123EUR").is_ok());
        assert!(Money::from_str("-4EUR").is_ok());
    }

    #[test]
    fn displays_minor_units() {
        assert_eq!(eur("123.45").to_string(), "123.45EUR");
        assert_eq!(eur("70.2").to_string(), "70.20EUR");
        assert_eq!(eur("6.505").to_string(), "6.51EUR");
        assert_eq!(eur("58.5").to_string(), "58.50EUR");
        assert_eq!(eur("123.00").to_string(), "123EUR");
        assert_eq!(eur("123").to_string(), "123EUR");
        assert_eq!(eur("0.001").to_string(), "0EUR");
    }

    #[test]
    fn adds_only_same_currency() {
        assert_eq!(eur("1.5").checked_add(eur("2")), Some(eur("3.5")));
        assert_eq!(
            eur("1").checked_add(Money::new(Decimal::ONE, Currency::Usd)),
            None,
        );
    }

    #[test]
    fn scales_without_rounding() {
        assert_eq!(eur("12.5") * Decimal::new(15, 1), eur("18.75"));
        assert_eq!(
            (eur("0.333") * Decimal::TWO).amount,
            "0.666".parse().unwrap(),
        );
    }
}
