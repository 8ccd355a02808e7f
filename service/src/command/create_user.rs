//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Login, Name, Password, Phone};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Login`] of a new [`User`].
    pub login: user::Login,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: Option<user::Email>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,
}

/// Name of the unique constraint on [`user::Login`]s.
const LOGIN_CONSTRAINT: &str = "users_login_key";

impl<Db, Au> Command<CreateUser> for Service<Db, Au>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            login,
            password,
            email,
            phone,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::LoginOccupied(login)));
        }

        let password_hash = user::PasswordHash::new(password.expose_secret())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let user = User {
            id: user::Id::new(),
            name,
            login,
            password_hash,
            email,
            phone,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let inserted = tx.execute(Insert(user.clone())).await;
        if inserted.as_ref().is_err_and(|e| {
            e.as_ref().is_unique_violation(Some(LOGIN_CONSTRAINT))
        }) {
            return Err(tracerr::new!(E::LoginOccupied(user.login)));
        }
        inserted.map_err(tracerr::map_from_and_wrap!(=> E)).map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    #[from(ignore)]
    LoginOccupied(#[error(not(source))] user::Login),

    /// [`Password`] cannot be hashed.
    #[display("Failed to hash password: {_0}")]
    PasswordHash(#[error(not(source))] argon2::password_hash::Error),
}
