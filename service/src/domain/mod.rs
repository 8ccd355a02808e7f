//! Domain definitions.

pub mod catalog;
pub mod client;
pub mod contact;
pub mod document;
pub mod invoice;
pub mod line;
pub mod quote;
pub mod reminder;
pub mod totals;
pub mod user;
pub mod vehicle;

pub use self::{
    catalog::Item as CatalogItem, client::Client, invoice::Invoice,
    line::Line, quote::Quote, reminder::Reminder, totals::Totals, user::User,
    vehicle::Vehicle,
};

/// Defines a validated free-text newtype.
///
/// Values must not be empty, must not start or end with whitespace, must fit
/// into `max_len` characters, and may contain line breaks only when
/// `multiline` is `true`.
macro_rules! define_text {
    (
        $(#[doc = $doc:literal])+
        pub struct $name:ident;
        max_len = $max:literal;
        multiline = $multiline:literal;
    ) => {
        $(#[doc = $doc])+
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            PartialEq,
            ::serde::Serialize,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = ::core::concat!(
                "Creates a new [`", ::core::stringify!($name), "`] without ",
                "checking its format.",
            )]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` matches the
            /// format.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[doc = ::core::concat!(
                "Creates a new [`", ::core::stringify!($name), "`] if the ",
                "given `value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            /// Checks whether the given `value` has a valid format.
            fn check(value: &str) -> bool {
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= $max
                    && value.chars().all(|c| {
                        !c.is_control() || ($multiline && c.is_whitespace())
                    })
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(::core::concat!(
                    "invalid `", ::core::stringify!($name), "`",
                ))
            }
        }
    };
}

/// Defines a random UUID-based identifier newtype.
macro_rules! define_id {
    (
        $(#[doc = $doc:literal])+
        pub struct $name:ident;
    ) => {
        $(#[doc = $doc])+
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            ::serde::Deserialize,
            ::derive_more::Display,
            Eq,
            ::derive_more::From,
            ::derive_more::FromStr,
            Hash,
            ::derive_more::Into,
            Ord,
            PartialEq,
            PartialOrd,
            ::serde::Serialize,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        pub struct $name(::uuid::Uuid);

        impl $name {
            #[doc = ::core::concat!(
                "Creates a new random [`", ::core::stringify!($name), "`].",
            )]
            #[must_use]
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }
    };
}

pub(crate) use define_id;
pub(crate) use define_text;
