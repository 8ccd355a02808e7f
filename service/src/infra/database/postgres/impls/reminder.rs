//! [`Reminder`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{reminder, Reminder},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of a [`Reminder`] row.
const COLUMNS: &str = "\
    id, client_id, quote_id, invoice_id, note, due_on, done_at, created_at";

/// Maps the provided [`Row`] into a [`Reminder`].
fn from_row(row: &Row) -> Reminder {
    Reminder {
        id: row.get("id"),
        client_id: row.get("client_id"),
        quote_id: row.get("quote_id"),
        invoice_id: row.get("invoice_id"),
        note: row.get("note"),
        due_on: row.get("due_on"),
        done_at: row.get("done_at"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<reminder::Id, Reminder>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[reminder::Id]>,
{
    type Ok = HashMap<reminder::Id, Reminder>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<reminder::Id, Reminder>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[reminder::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM reminders \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let reminder = from_row(row);
                (reminder.id, reminder)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Reminder>, reminder::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<reminder::Id, Reminder>, [reminder::Id; 1]>>,
        Ok = HashMap<reminder::Id, Reminder>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Reminder>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Reminder>, reminder::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Reminder>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Reminder>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(reminder): Insert<Reminder>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(reminder)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Reminder>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(reminder): Update<Reminder>,
    ) -> Result<Self::Ok, Self::Err> {
        let Reminder {
            id,
            client_id,
            quote_id,
            invoice_id,
            note,
            due_on,
            done_at,
            created_at,
        } = reminder;

        const SQL: &str = "\
            INSERT INTO reminders (\
                id, client_id, quote_id, invoice_id, note, due_on, done_at, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::VARCHAR, \
                $6::DATE, $7::TIMESTAMPTZ, $8::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET client_id = EXCLUDED.client_id, \
                quote_id = EXCLUDED.quote_id, \
                invoice_id = EXCLUDED.invoice_id, \
                note = EXCLUDED.note, \
                due_on = EXCLUDED.due_on, \
                done_at = EXCLUDED.done_at";
        self.exec(
            SQL,
            &[
                &id,
                &client_id,
                &quote_id,
                &invoice_id,
                &note,
                &due_on,
                &done_at,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Reminder, reminder::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Reminder, reminder::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reminder::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM reminders \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Reminder, reminder::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Reminder, reminder::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: reminder::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM reminders \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<By<read::reminder::list::Page, read::reminder::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::reminder::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::reminder::list::Page, read::reminder::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::reminder::list::Selector {
            arguments,
            filter:
                read::reminder::list::Filter {
                    include_done,
                    client_id,
                },
        } = by.into_inner();

        let limit =
            i32::try_from(arguments.limit()).unwrap_or(i32::MAX - 1) + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let client_idx = client_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let direction = arguments.direction();
        let sql = format!(
            "SELECT id \
             FROM reminders \
             WHERE true \
                   {cursor} \
                   {client_filtering} \
                   {done_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = direction.operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = direction.sql_order(),
            client_filtering =
                client_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND client_id = ${idx}::UUID"))
                }),
            done_filtering = if include_done {
                ""
            } else {
                "AND done_at IS NULL"
            },
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::reminder::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::reminder::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::reminder::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::reminder::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM reminders";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
