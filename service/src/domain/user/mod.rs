//! [`User`] definitions.

pub mod session;

use std::{fmt, str::FromStr, sync::LazyLock};

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};

pub use super::contact::{Email, Phone};
use super::{define_id, define_text};

pub use self::session::Session;

/// Staff member of the garage.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Login`] of this [`User`].
    pub login: Login,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Email`] of this [`User`].
    pub email: Option<Email>,

    /// [`Phone`] of this [`User`].
    pub phone: Option<Phone>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

define_id! {
    /// ID of a [`User`].
    pub struct Id;
}

define_text! {
    /// Name of a [`User`].
    pub struct Name;
    max_len = 512;
    multiline = false;
}

/// Login of a [`User`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `login` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Login`] invariants:
        /// - Must contain letters, digits, `.`, `_` or `-` only;
        /// - Must start with a letter or a digit;
        /// - Must be between 2 and 64 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N}._\-]{1,63}$")
                .expect("valid regex")
        });

        REGEX.is_match(login.as_ref())
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        (8..=128).contains(&password.chars().count())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Argon2 hash of a [`User`]'s [`Password`] in the PHC string format.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the given [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If the hashing fails.
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|h| Self(h.to_string()))
    }

    /// Verifies whether the given [`Password`] matches this [`PasswordHash`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|h| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &h)
                .is_ok()
        })
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Login, Password, PasswordHash};

    #[test]
    fn login_format() {
        assert!(Login::new("j.dupont").is_some());
        assert!(Login::new("garage-42").is_some());

        assert!(Login::new("j").is_none());
        assert!(Login::new(".dupont").is_none());
        assert!(Login::new("jean dupont").is_none());
    }

    #[test]
    fn password_length() {
        assert!(Password::new("short").is_none());
        assert!(Password::new("long enough").is_some());
        assert!(Password::new("x".repeat(129)).is_none());
    }

    #[test]
    fn hash_verifies_only_same_password() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("battery staple").unwrap()));
        assert_ne!(hash, PasswordHash::new(&password).unwrap());
    }

    #[test]
    fn password_is_not_printed() {
        let password = Password::new("correct horse").unwrap();
        assert_eq!(format!("{password:?}"), "Password(***)");
    }
}
