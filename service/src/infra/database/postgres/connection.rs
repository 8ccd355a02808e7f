//! [`Connection`] definitions.

use std::future::Future;

use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as Pooled, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Generic database connection.
pub trait Connection {
    /// Queries the provided statement with the given parameters and returns
    /// the resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Queries the provided statement with the given parameters and returns
    /// the optional resulting row.
    ///
    /// # Errors
    ///
    /// If failed to query the statement, or it returned more than one row.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Executes the provided statement with the given parameters and returns
    /// the number of affected rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the statement.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;
}

/// Wraps a [`tokio_postgres`] result into a [`Traced`] [`database::Error`].
pub(crate) fn traced<T>(
    res: Result<T, Error>,
) -> Result<T, Traced<database::Error>> {
    res.map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

impl Connection for Pooled {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        traced((**self).query(stmt, params).await)
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        traced((**self).query_opt(stmt, params).await)
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        traced((**self).execute(stmt, params).await)
    }
}

/// [`Pooled`] connection with an open transaction.
///
/// Dropping it without [`Transaction::commit()`] detaches the connection
/// from its [`Pool`] and closes it, so the server rolls the transaction back.
#[derive(Debug)]
pub struct Transaction {
    /// [`Pooled`] connection the transaction is open in.
    ///
    /// Taken out on commit or drop only.
    conn: Option<Pooled>,
}

impl Transaction {
    /// Opens a new [`Transaction`] in the provided [`Pooled`] connection.
    ///
    /// # Errors
    ///
    /// If failed to open the transaction.
    pub async fn begin(conn: Pooled) -> Result<Self, Traced<database::Error>> {
        traced(conn.batch_execute("BEGIN").await)?;
        Ok(Self { conn: Some(conn) })
    }

    /// Commits this [`Transaction`], returning its connection to the
    /// [`Pool`].
    ///
    /// # Errors
    ///
    /// If failed to commit this [`Transaction`].
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        match self.conn.take() {
            Some(conn) => traced(conn.batch_execute("COMMIT").await),
            None => Ok(()),
        }
    }

    /// Returns the [`Pooled`] connection of this [`Transaction`].
    fn conn(&self) -> &Pooled {
        self.conn.as_ref().expect("taken on commit or drop only")
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(deadpool_postgres::Object::take(conn));
        }
    }
}

impl Connection for Transaction {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.conn().query(stmt, params).await
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.conn().query_opt(stmt, params).await
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.conn().exec(stmt, params).await
    }
}
