//! [`Quote`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{quote, Quote},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::line::{self, QUOTE_LINES};

/// Columns of a [`Quote`] row.
const COLUMNS: &str = "\
    id, number, client_id, vehicle_id, \
    discount_kind, discount_value, currency, \
    status, document_url, comments, valid_until, \
    created_at, updated_at, sent_at";

/// Maps the provided [`Row`] into a [`Quote`] without its lines.
fn from_row(row: &Row) -> Quote {
    Quote {
        id: row.get("id"),
        number: row.get("number"),
        client_id: row.get("client_id"),
        vehicle_id: row.get("vehicle_id"),
        lines: vec![],
        discount: line::discount_from_parts(
            row.get("discount_kind"),
            row.get("discount_value"),
        ),
        currency: row.get("currency"),
        status: row.get("status"),
        document_url: row.get("document_url"),
        comments: row.get("comments"),
        valid_until: row.get("valid_until"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        sent_at: row.get("sent_at"),
    }
}

/// Fills the provided [`Quote`]s with their lines.
async fn with_lines<C>(
    db: &Postgres<C>,
    mut quotes: Vec<Quote>,
) -> Result<Vec<Quote>, Traced<database::Error>>
where
    C: Connection,
{
    let ids = quotes.iter().map(|q| q.id).collect::<Vec<_>>();
    if ids.is_empty() {
        return Ok(quotes);
    }

    let mut lines = line::select(db, QUOTE_LINES, &ids)
        .await
        .map_err(tracerr::wrap!())?;
    for q in &mut quotes {
        q.lines = lines.remove(&q.id).unwrap_or_default();
    }
    Ok(quotes)
}

impl<C, IDs> Database<Select<By<HashMap<quote::Id, Quote>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[quote::Id]>,
{
    type Ok = HashMap<quote::Id, Quote>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<quote::Id, Quote>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[quote::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM quotes \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        let quotes = self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect();
        Ok(with_lines(self, quotes)
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|q| (q.id, q))
            .collect())
    }
}

impl<C> Database<Select<By<Option<Quote>, quote::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<quote::Id, Quote>, [quote::Id; 1]>>,
        Ok = HashMap<quote::Id, Quote>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Quote>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Quote>, quote::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<quote::Number, quote::CreationDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = quote::Number;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<quote::Number, quote::CreationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let created_at = by.into_inner();

        const SQL: &str = "SELECT nextval('quote_number_seq')";
        let seq = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .map_or(1, |r| r.get::<_, i64>(0));
        Ok(quote::Number::new(created_at.year(), seq))
    }
}

impl<C> Database<Select<By<Vec<Quote>, read::quote::SentBefore>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Quote>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Quote>, read::quote::SentBefore>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::quote::SentBefore(deadline) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM quotes \
             WHERE status = $1::INT2 \
               AND sent_at < $2::TIMESTAMPTZ \
             ORDER BY sent_at",
        );
        let quotes = self
            .query(&sql, &[&quote::Status::Sent, &deadline])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect();
        with_lines(self, quotes).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<read::quote::Board, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::quote::Board;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::quote::Board, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM quotes \
             ORDER BY updated_at DESC, id",
        );
        let quotes = self
            .query(&sql, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect();
        let quotes =
            with_lines(self, quotes).await.map_err(tracerr::wrap!())?;
        Ok(read::quote::Board::new(quotes))
    }
}

impl<C> Database<Insert<Quote>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Quote>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(quote): Insert<Quote>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(quote)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Quote>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(quote): Update<Quote>,
    ) -> Result<Self::Ok, Self::Err> {
        let Quote {
            id,
            number,
            client_id,
            vehicle_id,
            lines,
            discount,
            currency,
            status,
            document_url,
            comments,
            valid_until,
            created_at,
            updated_at,
            sent_at,
        } = quote;

        let (discount_kind, discount_value) = line::discount_parts(discount);

        const SQL: &str = "\
            INSERT INTO quotes (\
                id, number, client_id, vehicle_id, \
                discount_kind, discount_value, currency, \
                status, document_url, comments, valid_until, \
                created_at, updated_at, sent_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, $4::UUID, \
                $5::INT2, $6::NUMERIC, $7::INT2, \
                $8::INT2, $9::VARCHAR, $10::VARCHAR, $11::DATE, \
                $12::TIMESTAMPTZ, $13::TIMESTAMPTZ, $14::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET client_id = EXCLUDED.client_id, \
                vehicle_id = EXCLUDED.vehicle_id, \
                discount_kind = EXCLUDED.discount_kind, \
                discount_value = EXCLUDED.discount_value, \
                currency = EXCLUDED.currency, \
                status = EXCLUDED.status, \
                document_url = EXCLUDED.document_url, \
                comments = EXCLUDED.comments, \
                valid_until = EXCLUDED.valid_until, \
                updated_at = EXCLUDED.updated_at, \
                sent_at = EXCLUDED.sent_at";
        _ = self
            .exec(
                SQL,
                &[
                    &id,
                    &number,
                    &client_id,
                    &vehicle_id,
                    &discount_kind,
                    &discount_value,
                    &currency,
                    &status,
                    &document_url,
                    &comments,
                    &valid_until,
                    &created_at,
                    &updated_at,
                    &sent_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        line::replace(self, QUOTE_LINES, &id, &lines)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Quote, quote::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Quote, quote::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: quote::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM quotes \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Quote, quote::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Quote, quote::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: quote::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM quotes \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<Select<By<read::quote::list::Page, read::quote::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::quote::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::quote::list::Page, read::quote::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::quote::list::Selector {
            arguments,
            filter: read::quote::list::Filter { status, client_id },
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
        let client_idx = client_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });

        let direction = arguments.direction();
        let sql = format!(
            "SELECT id \
             FROM quotes \
             WHERE true \
                   {cursor} \
                   {status_filtering} \
                   {client_filtering} \
             ORDER BY id {order} \
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
            client_filtering =
                client_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND client_id = ${idx}::UUID"))
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

        Ok(read::quote::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::quote::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::quote::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::quote::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM quotes";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
