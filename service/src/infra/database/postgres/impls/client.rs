//! [`Client`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{client, Client},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of a [`Client`] row.
const COLUMNS: &str = "\
    id, kind, name, email, phone, address, notes, status, created_at";

/// Maps the provided [`Row`] into a [`Client`].
fn from_row(row: &Row) -> Client {
    Client {
        id: row.get("id"),
        kind: row.get("kind"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        notes: row.get("notes"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<client::Id, Client>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[client::Id]>,
{
    type Ok = HashMap<client::Id, Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<client::Id, Client>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[client::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM clients \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let client = from_row(row);
                (client.id, client)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Client>, client::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<client::Id, Client>, [client::Id; 1]>>,
        Ok = HashMap<client::Id, Client>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<Client>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Client>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(client): Insert<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(client)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Client>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(client): Update<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        let Client {
            id,
            kind,
            name,
            email,
            phone,
            address,
            notes,
            status,
            created_at,
        } = client;

        const SQL: &str = "\
            INSERT INTO clients (\
                id, kind, name, email, phone, address, notes, status, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::INT2, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, $6::VARCHAR, $7::VARCHAR, \
                $8::INT2, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET kind = EXCLUDED.kind, \
                name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                address = EXCLUDED.address, \
                notes = EXCLUDED.notes, \
                status = EXCLUDED.status";
        self.exec(
            SQL,
            &[
                &id,
                &kind,
                &name,
                &email,
                &phone,
                &address,
                &notes,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Client, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: client::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM clients \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Client, client::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Client, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: client::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM clients \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::client::list::Page, read::client::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::client::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::client::list::Page, read::client::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::client::list::Selector {
            arguments,
            filter: read::client::list::Filter { name, status },
        } = by.into_inner();

        let limit =
            i32::try_from(arguments.limit()).unwrap_or(i32::MAX - 1) + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let name_idx = name.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let name_pattern = name.as_ref().map(|n| FuzzPattern::new(n.as_ref()));
        let name_pattern_idx = name_pattern.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });

        let direction = arguments.direction();
        let sql = format!(
            "SELECT id \
             FROM clients \
             WHERE true \
                   {cursor} \
                   {status_filtering} \
                   {name_filtering} \
             ORDER BY {name_ordering} \
                      id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = direction.operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = direction.sql_order(),
            status_filtering =
                status_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND status = ${idx}::INT2"))
                }),
            name_filtering =
                name_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(name) SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
            name_ordering = name_idx.into_iter().format_with("", |idx, f| {
                let order = direction.sql_order();
                f(&format_args!(
                    "LEVENSHTEIN(name, ${idx}::VARCHAR, 1, 1, 0) {order},"
                ))
            }),
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

        Ok(read::client::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::client::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::client::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::client::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM clients";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
