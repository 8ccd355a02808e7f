//! Definitions shared by [`Quote`] and [`Invoice`] documents.

use std::str::FromStr;

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::Serialize;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};

use super::define_text;

/// URL of a generated PDF document.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Url(String);

impl Url {
    /// Creates a new [`Url`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`Url`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is an absolute HTTP(S) [`Url`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        rest.is_some_and(|r| {
            !r.is_empty()
                && !r.starts_with('/')
                && url.len() <= 2048
                && !url.chars().any(|c| c.is_whitespace() || c.is_control())
        })
    }
}

impl FromStr for Url {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Url`")
    }
}

/// Defines a human-readable document number newtype formatted as
/// `{prefix}-{year}-{sequence}`, with the sequence padded to 5 digits.
macro_rules! define_number {
    (
        $(#[doc = $doc:literal])+
        pub struct $name:ident;
        prefix = $prefix:literal;
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
                "Prefix of every [`", ::core::stringify!($name), "`].",
            )]
            pub const PREFIX: &'static str = $prefix;

            #[doc = ::core::concat!(
                "Creates a new [`", ::core::stringify!($name), "`] out of ",
                "the provided `year` and `sequence` value.",
            )]
            #[must_use]
            pub fn new(year: i32, sequence: i64) -> Self {
                Self(::std::format!(
                    "{}-{year:04}-{sequence:05}",
                    Self::PREFIX,
                ))
            }

            /// Checks whether the given `number` has a valid format.
            fn check(number: &str) -> bool {
                let Some(rest) = number
                    .strip_prefix(Self::PREFIX)
                    .and_then(|r| r.strip_prefix('-'))
                else {
                    return false;
                };
                let Some((year, sequence)) = rest.split_once('-') else {
                    return false;
                };
                year.len() == 4
                    && sequence.len() >= 5
                    && year.bytes().chain(sequence.bytes()).all(
                        |b| b.is_ascii_digit(),
                    )
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::check(s)
                    .then(|| Self(s.to_owned()))
                    .ok_or(::core::concat!(
                        "invalid `", ::core::stringify!($name), "`",
                    ))
            }
        }
    };
}

pub(crate) use define_number;

define_text! {
    /// Comments printed at the bottom of a document.
    pub struct Comments;
    max_len = 4096;
    multiline = true;
}

define_text! {
    /// Subject of an email carrying a document.
    pub struct Subject;
    max_len = 256;
    multiline = false;
}

define_text! {
    /// Body of an email carrying a document.
    pub struct Body;
    max_len = 8192;
    multiline = true;
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{define_number, Url};

    define_number! {
        /// Test number.
        pub struct Number;
        prefix = "T";
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(Number::new(2024, 7).to_string(), "T-2024-00007");
        assert_eq!(Number::new(2024, 123_456).to_string(), "T-2024-123456");
        assert_eq!(
            Number::from_str("T-2024-00007").unwrap(),
            Number::new(2024, 7),
        );

        assert!(Number::from_str("D-2024-00007").is_err());
        assert!(Number::from_str("T-24-00007").is_err());
        assert!(Number::from_str("T-2024-7").is_err());
        assert!(Number::from_str("T-2024-0000a").is_err());
    }

    #[test]
    fn accepts_only_http_urls() {
        assert!(Url::new("https://cdn.example.com/devis/D-2024-00001.pdf")
            .is_some());
        assert!(Url::new("http://localhost:8080/d.pdf").is_some());

        assert!(Url::new("ftp://example.com/d.pdf").is_none());
        assert!(Url::new("https://").is_none());
        assert!(Url::new("https:///d.pdf").is_none());
        assert!(Url::new("https://example.com/a b.pdf").is_none());
        assert!(Url::new("example.com/d.pdf").is_none());
    }
}
