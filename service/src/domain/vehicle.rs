//! [`Vehicle`] definitions.

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::Serialize;

#[cfg(doc)]
use crate::domain::Client;
use crate::domain::client;

use super::{define_id, define_text};

/// Vehicle brought to the garage by a [`Client`].
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: Id,

    /// ID of the [`Client`] owning this [`Vehicle`].
    pub client_id: client::Id,

    /// [`Plate`] of this [`Vehicle`].
    pub plate: Plate,

    /// [`Make`] of this [`Vehicle`].
    pub make: Make,

    /// [`Model`] of this [`Vehicle`].
    pub model: Model,

    /// [`Year`] this [`Vehicle`] model was released in.
    pub year: Option<Year>,

    /// [`Mileage`] of this [`Vehicle`].
    pub mileage: Option<Mileage>,

    /// [`Vin`] of this [`Vehicle`].
    pub vin: Option<Vin>,

    /// [`DateTime`] when this [`Vehicle`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    /// ID of a [`Vehicle`].
    pub struct Id;
}

/// Registration plate of a [`Vehicle`], normalized to upper case.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Plate(String);

impl Plate {
    /// Creates a new [`Plate`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `plate` is normalized and
    /// matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(plate: impl Into<String>) -> Self {
        Self(plate.into())
    }

    /// Creates a new [`Plate`] out of the given `plate`, normalizing it.
    ///
    /// [`None`] is returned if the normalized `plate` is invalid.
    #[must_use]
    pub fn new(plate: impl AsRef<str>) -> Option<Self> {
        let plate = plate.as_ref().trim().to_uppercase();
        Self::check(&plate).then_some(Self(plate))
    }

    /// Checks whether the given normalized `plate` is a valid [`Plate`].
    fn check(plate: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Plate`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-Z0-9][A-Z0-9 \-]{0,14}[A-Z0-9]$")
                .expect("valid regex")
        });

        REGEX.is_match(plate.as_ref())
    }
}

impl FromStr for Plate {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Plate`")
    }
}

define_text! {
    /// Manufacturer of a [`Vehicle`].
    pub struct Make;
    max_len = 64;
    multiline = false;
}

define_text! {
    /// Model name of a [`Vehicle`].
    pub struct Model;
    max_len = 128;
    multiline = false;
}

/// Model year of a [`Vehicle`].
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Year(u16);

impl Year {
    /// Earliest accepted [`Year`].
    pub const MIN: u16 = 1886;

    /// Creates a new [`Year`] if the given `year` is plausible, meaning not
    /// before [`Year::MIN`] and not after the next calendar year.
    #[must_use]
    pub fn new(year: u16) -> Option<Self> {
        let max = common::Date::today().year() + 1;
        (year >= Self::MIN && i32::from(year) <= max).then_some(Self(year))
    }
}

/// Odometer reading of a [`Vehicle`] in kilometers.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Mileage(u32);

impl Mileage {
    /// Maximum accepted [`Mileage`].
    pub const MAX: u32 = 2_000_000;

    /// Creates a new [`Mileage`] if the given `km` is plausible.
    #[must_use]
    pub fn new(km: u32) -> Option<Self> {
        (km <= Self::MAX).then_some(Self(km))
    }
}

/// Vehicle identification number.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Vin(String);

impl Vin {
    /// Creates a new [`Vin`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `vin` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(vin: impl Into<String>) -> Self {
        Self(vin.into())
    }

    /// Creates a new [`Vin`] out of the given `vin`, normalizing it to upper
    /// case.
    #[must_use]
    pub fn new(vin: impl AsRef<str>) -> Option<Self> {
        let vin = vin.as_ref().trim().to_uppercase();
        Self::check(&vin).then_some(Self(vin))
    }

    /// Checks whether the given normalized `vin` is a valid [`Vin`].
    fn check(vin: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Vin`] format.
        ///
        /// `I`, `O` and `Q` are excluded to avoid confusion with digits.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("valid regex")
        });

        REGEX.is_match(vin.as_ref())
    }
}

impl FromStr for Vin {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Vin`")
    }
}

/// [`DateTime`] when a [`Vehicle`] was created.
pub type CreationDateTime = DateTimeOf<(Vehicle, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Mileage, Plate, Vin, Year};

    #[test]
    fn normalizes_plate() {
        let plate = |s: &str| Plate::new(s).map(|p| p.to_string());
        assert_eq!(plate(" ab-123-cd ").as_deref(), Some("AB-123-CD"));
        assert_eq!(plate("1234 xy 75").as_deref(), Some("1234 XY 75"));

        assert!(plate("").is_none());
        assert!(plate("-AB123").is_none());
        assert!(plate("AB_123").is_none());
    }

    #[test]
    fn accepts_plausible_years() {
        assert!(Year::new(1886).is_some());
        assert!(Year::new(2015).is_some());
        assert!(Year::new(1885).is_none());
        assert!(Year::new(3000).is_none());
    }

    #[test]
    fn bounds_mileage() {
        assert!(Mileage::new(0).is_some());
        assert!(Mileage::new(Mileage::MAX).is_some());
        assert!(Mileage::new(Mileage::MAX + 1).is_none());
    }

    #[test]
    fn validates_vin() {
        assert_eq!(
            Vin::new("vf1rfb00123456789").unwrap().to_string(),
            "VF1RFB00123456789",
        );
        assert!(Vin::new("VF1RFB0012345678").is_none());
        assert!(Vin::new("VF1RFB0012345678O").is_none());
    }
}
