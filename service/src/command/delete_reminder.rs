//! [`Command`] for deleting a [`Reminder`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reminder, Reminder},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Reminder`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteReminder {
    /// ID of the [`Reminder`] to be deleted.
    pub reminder_id: reminder::Id,
}

impl<Db, Au> Command<DeleteReminder> for Service<Db, Au>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Reminder, reminder::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reminder>, reminder::Id>>,
            Ok = Option<Reminder>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Reminder, reminder::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Reminder;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteReminder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteReminder { reminder_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(reminder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let reminder = tx
            .execute(Select(By::<Option<Reminder>, _>::new(reminder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReminderNotExists(reminder_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::new(reminder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(reminder)
    }
}

/// Error of [`DeleteReminder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Reminder`] with the provided ID does not exist.
    #[display("`Reminder(id: {_0})` does not exist")]
    #[from(ignore)]
    ReminderNotExists(#[error(not(source))] reminder::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
