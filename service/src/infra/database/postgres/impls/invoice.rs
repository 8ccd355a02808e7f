//! [`Invoice`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        invoice::{self, PaymentStatus},
        Invoice,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::line::{self, INVOICE_LINES};

/// Columns of an [`Invoice`] row.
const COLUMNS: &str = "\
    id, number, client_id, vehicle_id, quote_id, \
    discount_kind, discount_value, currency, \
    due_on, payment_method, paid_on, \
    document_url, comments, \
    created_at, updated_at";

/// Maps the provided [`Row`] into an [`Invoice`] without its lines.
fn from_row(row: &Row) -> Invoice {
    let method: Option<invoice::PaymentMethod> = row.get("payment_method");
    let paid_on: Option<invoice::PaymentDate> = row.get("paid_on");

    Invoice {
        id: row.get("id"),
        number: row.get("number"),
        client_id: row.get("client_id"),
        vehicle_id: row.get("vehicle_id"),
        quote_id: row.get("quote_id"),
        lines: vec![],
        discount: line::discount_from_parts(
            row.get("discount_kind"),
            row.get("discount_value"),
        ),
        currency: row.get("currency"),
        due_on: row.get("due_on"),
        payment: method
            .zip(paid_on)
            .map(|(method, paid_on)| invoice::Payment { method, paid_on }),
        document_url: row.get("document_url"),
        comments: row.get("comments"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<invoice::Id, Invoice>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[invoice::Id]>,
{
    type Ok = HashMap<invoice::Id, Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<invoice::Id, Invoice>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[invoice::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM invoices \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        let mut invoices = self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let invoice = from_row(row);
                (invoice.id, invoice)
            })
            .collect::<HashMap<_, _>>();

        let found = invoices.keys().copied().collect::<Vec<_>>();
        let mut lines = line::select(self, INVOICE_LINES, &found)
            .await
            .map_err(tracerr::wrap!())?;
        for (id, invoice) in &mut invoices {
            invoice.lines = lines.remove(id).unwrap_or_default();
        }

        Ok(invoices)
    }
}

impl<C> Database<Select<By<Option<Invoice>, invoice::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<invoice::Id, Invoice>, [invoice::Id; 1]>>,
        Ok = HashMap<invoice::Id, Invoice>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Invoice>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Invoice>, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<invoice::Number, invoice::CreationDateTime>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = invoice::Number;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<invoice::Number, invoice::CreationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let created_at = by.into_inner();

        const SQL: &str = "SELECT nextval('invoice_number_seq')";
        let seq = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .map_or(1, |r| r.get::<_, i64>(0));
        Ok(invoice::Number::new(created_at.year(), seq))
    }
}

impl<C> Database<Insert<Invoice>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Invoice>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(invoice): Insert<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(invoice)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Invoice>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(invoice): Update<Invoice>,
    ) -> Result<Self::Ok, Self::Err> {
        let Invoice {
            id,
            number,
            client_id,
            vehicle_id,
            quote_id,
            lines,
            discount,
            currency,
            due_on,
            payment,
            document_url,
            comments,
            created_at,
            updated_at,
        } = invoice;

        let (discount_kind, discount_value) = line::discount_parts(discount);
        let payment_method = payment.map(|p| p.method);
        let paid_on = payment.map(|p| p.paid_on);

        const SQL: &str = "\
            INSERT INTO invoices (\
                id, number, client_id, vehicle_id, quote_id, \
                discount_kind, discount_value, currency, \
                due_on, payment_method, paid_on, \
                document_url, comments, \
                created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, $4::UUID, $5::UUID, \
                $6::INT2, $7::NUMERIC, $8::INT2, \
                $9::DATE, $10::INT2, $11::DATE, \
                $12::VARCHAR, $13::VARCHAR, \
                $14::TIMESTAMPTZ, $15::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET client_id = EXCLUDED.client_id, \
                vehicle_id = EXCLUDED.vehicle_id, \
                quote_id = EXCLUDED.quote_id, \
                discount_kind = EXCLUDED.discount_kind, \
                discount_value = EXCLUDED.discount_value, \
                currency = EXCLUDED.currency, \
                due_on = EXCLUDED.due_on, \
                payment_method = EXCLUDED.payment_method, \
                paid_on = EXCLUDED.paid_on, \
                document_url = EXCLUDED.document_url, \
                comments = EXCLUDED.comments, \
                updated_at = EXCLUDED.updated_at";
        _ = self
            .exec(
                SQL,
                &[
                    &id,
                    &number,
                    &client_id,
                    &vehicle_id,
                    &quote_id,
                    &discount_kind,
                    &discount_value,
                    &currency,
                    &due_on,
                    &payment_method,
                    &paid_on,
                    &document_url,
                    &comments,
                    &created_at,
                    &updated_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        line::replace(self, INVOICE_LINES, &id, &lines)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Invoice, invoice::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Invoice, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: invoice::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM invoices \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Invoice, invoice::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Invoice, invoice::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: invoice::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM invoices \
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
        Select<By<read::invoice::list::Page, read::invoice::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::invoice::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::invoice::list::Page, read::invoice::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::invoice::list::Selector {
            arguments,
            filter:
                read::invoice::list::Filter {
                    client_id,
                    payment_status,
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
             FROM invoices \
             WHERE true \
                   {cursor} \
                   {client_filtering} \
                   {status_filtering} \
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
            status_filtering = match payment_status {
                None => "",
                Some(PaymentStatus::Paid) => "AND payment_method IS NOT NULL",
                Some(PaymentStatus::Overdue) => {
                    "AND payment_method IS NULL AND due_on < CURRENT_DATE"
                }
                Some(PaymentStatus::Pending) => {
                    "AND payment_method IS NULL AND due_on >= CURRENT_DATE"
                }
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

        Ok(read::invoice::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::invoice::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::invoice::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::invoice::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM invoices";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
