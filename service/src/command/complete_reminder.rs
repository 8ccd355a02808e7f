//! [`Command`] for marking a [`Reminder`] as done.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reminder, Reminder},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Reminder`] as done.
///
/// Completing a done [`Reminder`] keeps its original completion time.
#[derive(Clone, Copy, Debug)]
pub struct CompleteReminder {
    /// ID of the [`Reminder`] to be completed.
    pub reminder_id: reminder::Id,
}

impl<Db, Au> Command<CompleteReminder> for Service<Db, Au>
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
        > + Database<Update<Reminder>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Reminder;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteReminder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteReminder { reminder_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(reminder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut reminder = tx
            .execute(Select(By::<Option<Reminder>, _>::new(reminder_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ReminderNotExists(reminder_id))
            .map_err(tracerr::wrap!())?;
        if reminder.is_done() {
            return Ok(reminder);
        }

        reminder.done_at = Some(DateTime::now().coerce());
        tx.execute(Update(reminder.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(reminder)
    }
}

/// Error of [`CompleteReminder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Reminder`] with the provided ID does not exist.
    #[display("`Reminder(id: {_0})` does not exist")]
    #[from(ignore)]
    ReminderNotExists(#[error(not(source))] reminder::Id),
}
