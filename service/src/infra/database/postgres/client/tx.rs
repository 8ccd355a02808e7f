//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The [`connection::Transaction`] is opened lazily on the first operation,
/// and shared by all the clones of this client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to borrow the connection from.
    non_tx: NonTx,

    /// Lazily opened [`connection::Transaction`].
    tx: Arc<Mutex<Option<connection::Transaction>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            non_tx: client,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the [`connection::Transaction`] of this [`Tx`] client, opening
    /// it if required.
    async fn transaction(
        &self,
    ) -> Result<
        MutexGuard<'_, Option<connection::Transaction>>,
        Traced<database::Error>,
    > {
        let mut guard = self.tx.lock().await;
        if guard.is_none() {
            let conn =
                self.non_tx.connection().await.map_err(tracerr::wrap!())?;
            *guard = Some(
                connection::Transaction::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        Ok(guard)
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let tx = self.tx.lock().await.take();
        if let Some(tx) = tx {
            tx.commit().await.map_err(tracerr::wrap!())
        } else {
            Ok(())
        }
    }
}

/// Runs the provided operation on the [`connection::Transaction`] of the
/// given [`Tx`] client.
macro_rules! on_transaction {
    ($client:expr, |$tx:ident| $op:expr) => {{
        let guard = $client.transaction().await.map_err(tracerr::wrap!())?;
        match guard.as_ref() {
            Some($tx) => $op.await.map_err(tracerr::wrap!()),
            None => unreachable!("`Tx::transaction()` opens a transaction"),
        }
    }};
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_transaction!(self, |tx| tx.query(stmt, params))
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_transaction!(self, |tx| tx.query_opt(stmt, params))
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_transaction!(self, |tx| tx.exec(stmt, params))
    }
}
