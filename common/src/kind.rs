//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// The enum is stored as `INT2` in PostgreSQL and represented as
/// `SCREAMING_SNAKE_CASE` strings elsewhere.
///
/// # Example
///
/// ```rust
/// # use crate::common::define_kind;
///
/// define_kind! {
///     #[doc = "Payment method."]
///     enum Method {
///         #[doc = "Cash"]
///         Cash = 1,
///
///         #[doc = "Card"]
///         Card = 2,
///     }
/// }
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            #[doc = ::core::concat!(
                "All the [`", ::core::stringify!($name), "`] variants in ",
                "declaration order.",
            )]
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Converts the provided [`u8`] representation back into this
            /// kind.
            #[must_use]
            pub fn from_u8(value: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.u8() == value)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let v = u8::try_from(i16::from_sql(ty, raw)?)?;
                Self::from_u8(v).ok_or_else(|| ::std::format!(
                    "invalid `{}` value: {v}",
                    ::core::stringify!($name),
                ).into())
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.u8()).to_sql(ty, w)
            }
        }
    };
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    define_kind! {
        #[doc = "Test kind."]
        enum Light {
            #[doc = "Red."]
            Red = 1,

            #[doc = "Amber."]
            Amber = 2,

            #[doc = "Green."]
            Green = 3,
        }
    }

    #[test]
    fn lists_all_in_declaration_order() {
        assert_eq!(Light::ALL, &[Light::Red, Light::Amber, Light::Green]);
    }

    #[test]
    fn round_trips_through_u8() {
        assert_eq!(Light::from_u8(2), Some(Light::Amber));
        assert_eq!(Light::from_u8(0), None);
        assert_eq!(Light::Green.u8(), 3);
    }

    #[test]
    fn uses_screaming_snake_case_names() {
        assert_eq!(Light::Amber.to_string(), "AMBER");
        assert_eq!(Light::from_str("GREEN").unwrap(), Light::Green);
        assert!(Light::from_str("green").is_err());
    }
}
