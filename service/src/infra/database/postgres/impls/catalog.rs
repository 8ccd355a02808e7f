//! [`CatalogItem`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Currency, Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{catalog, CatalogItem},
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

/// Columns of a [`CatalogItem`] row.
const COLUMNS: &str = "\
    id, kind, label, currency, \
    estimated_time, hourly_rate, \
    reference, purchase_price, margin, \
    created_at";

/// Maps the provided [`Row`] into a [`CatalogItem`].
fn from_row(row: &Row) -> CatalogItem {
    let currency: Currency = row.get("currency");
    let money = |column: &str| {
        let amount: Option<Decimal> = row.get(column);
        Money::new(amount.expect("checked by constraint"), currency)
    };

    match row.get::<_, catalog::Kind>("kind") {
        catalog::Kind::Service => catalog::Service {
            id: row.get("id"),
            label: row.get("label"),
            estimated_time: row
                .get::<_, Option<catalog::Hours>>("estimated_time")
                .expect("checked by constraint"),
            hourly_rate: money("hourly_rate"),
            created_at: row.get("created_at"),
        }
        .into(),
        catalog::Kind::Part => catalog::Part {
            id: row.get("id"),
            label: row.get("label"),
            reference: row.get("reference"),
            purchase_price: money("purchase_price"),
            margin: row
                .get::<_, Option<catalog::Margin>>("margin")
                .expect("checked by constraint"),
            created_at: row.get("created_at"),
        }
        .into(),
    }
}

impl<C, IDs> Database<Select<By<HashMap<catalog::Id, CatalogItem>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[catalog::Id]>,
{
    type Ok = HashMap<catalog::Id, CatalogItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<catalog::Id, CatalogItem>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[catalog::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM catalog_items \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let item = from_row(row);
                (item.id(), item)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<CatalogItem>, catalog::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<catalog::Id, CatalogItem>, [catalog::Id; 1]>>,
        Ok = HashMap<catalog::Id, CatalogItem>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<CatalogItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<CatalogItem>, catalog::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Insert<CatalogItem>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<CatalogItem>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<CatalogItem>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(item)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<CatalogItem>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(item): Update<CatalogItem>,
    ) -> Result<Self::Ok, Self::Err> {
        let kind = item.kind();
        let (
            id,
            label,
            currency,
            estimated_time,
            hourly_rate,
            reference,
            purchase_price,
            margin,
            created_at,
        ) = match item {
            CatalogItem::Service(catalog::Service {
                id,
                label,
                estimated_time,
                hourly_rate,
                created_at,
            }) => (
                id,
                label,
                hourly_rate.currency,
                Some(estimated_time),
                Some(hourly_rate.amount),
                None,
                None,
                None,
                created_at,
            ),
            CatalogItem::Part(catalog::Part {
                id,
                label,
                reference,
                purchase_price,
                margin,
                created_at,
            }) => (
                id,
                label,
                purchase_price.currency,
                None,
                None,
                reference,
                Some(purchase_price.amount),
                Some(margin),
                created_at,
            ),
        };

        const SQL: &str = "\
            INSERT INTO catalog_items (\
                id, kind, label, currency, \
                estimated_time, hourly_rate, \
                reference, purchase_price, margin, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::INT2, $3::VARCHAR, $4::INT2, \
                $5::NUMERIC, $6::NUMERIC, \
                $7::VARCHAR, $8::NUMERIC, $9::NUMERIC, \
                $10::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET kind = EXCLUDED.kind, \
                label = EXCLUDED.label, \
                currency = EXCLUDED.currency, \
                estimated_time = EXCLUDED.estimated_time, \
                hourly_rate = EXCLUDED.hourly_rate, \
                reference = EXCLUDED.reference, \
                purchase_price = EXCLUDED.purchase_price, \
                margin = EXCLUDED.margin";
        self.exec(
            SQL,
            &[
                &id,
                &kind,
                &label,
                &currency,
                &estimated_time,
                &hourly_rate,
                &reference,
                &purchase_price,
                &margin,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<CatalogItem, catalog::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<CatalogItem, catalog::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: catalog::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM catalog_items \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<CatalogItem, catalog::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<CatalogItem, catalog::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: catalog::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM catalog_items \
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
        Select<By<read::catalog::list::Page, read::catalog::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::catalog::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::catalog::list::Page, read::catalog::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::catalog::list::Selector {
            arguments,
            filter: read::catalog::list::Filter { kind, label },
        } = by.into_inner();

        let limit =
            i32::try_from(arguments.limit()).unwrap_or(i32::MAX - 1) + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let kind_idx = kind.as_ref().map(|k| {
            ps.push(k);
            ps.len()
        });
        let label_idx = label.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });

        let label_pattern =
            label.as_ref().map(|l| FuzzPattern::new(l.as_ref()));
        let label_pattern_idx = label_pattern.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });

        let direction = arguments.direction();
        let sql = format!(
            "SELECT id \
             FROM catalog_items \
             WHERE true \
                   {cursor} \
                   {kind_filtering} \
                   {label_filtering} \
             ORDER BY {label_ordering} \
                      id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = direction.operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = direction.sql_order(),
            kind_filtering = kind_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND kind = ${idx}::INT2"))
            }),
            label_filtering =
                label_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(label) SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
            label_ordering = label_idx.into_iter().format_with("", |idx, f| {
                let order = direction.sql_order();
                f(&format_args!(
                    "LEVENSHTEIN(label, ${idx}::VARCHAR, 1, 1, 0) {order},"
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

        Ok(read::catalog::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::catalog::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::catalog::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::catalog::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM catalog_items";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
