//! [`Line`]s persistence shared by [`Quote`]s and [`Invoice`]s.

use std::{collections::HashMap, hash::Hash};

use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Invoice, Quote};
use crate::{
    domain::{
        totals::{Discount, DiscountKind},
        Line,
    },
    infra::database::{self, postgres::Connection, Postgres},
};

/// Table storing [`Line`]s of a single kind of documents.
#[derive(Clone, Copy, Debug)]
pub(super) struct Table {
    /// Name of the table.
    pub(super) name: &'static str,

    /// Column referencing the document owning a [`Line`].
    pub(super) owner: &'static str,
}

/// Table of [`Quote`] [`Line`]s.
pub(super) const QUOTE_LINES: Table = Table {
    name: "quote_lines",
    owner: "quote_id",
};

/// Table of [`Invoice`] [`Line`]s.
pub(super) const INVOICE_LINES: Table = Table {
    name: "invoice_lines",
    owner: "invoice_id",
};

/// Selects [`Line`]s of the documents with the provided IDs, keeping their
/// order.
pub(super) async fn select<C, Id>(
    db: &Postgres<C>,
    table: Table,
    ids: &[Id],
) -> Result<HashMap<Id, Vec<Line>>, Traced<database::Error>>
where
    C: Connection,
    Id: for<'r> FromSql<'r> + ToSql + Sync + Eq + Hash,
{
    let Table { name, owner } = table;
    let sql = format!(
        "SELECT {owner} AS owner, \
                kind, designation, quantity, unit_price, vat_rate, \
                catalog_item_id \
         FROM {name} \
         WHERE {owner} = ANY($1::UUID[]) \
         ORDER BY {owner}, position",
    );

    let mut lines = HashMap::<_, Vec<_>>::new();
    for row in db.query(&sql, &[&ids]).await.map_err(tracerr::wrap!())? {
        lines.entry(row.get("owner")).or_default().push(Line {
            kind: row.get("kind"),
            designation: row.get("designation"),
            quantity: row.get("quantity"),
            unit_price: row.get("unit_price"),
            vat_rate: row.get("vat_rate"),
            catalog_item_id: row.get("catalog_item_id"),
        });
    }
    Ok(lines)
}

/// Replaces [`Line`]s of the document with the provided ID.
pub(super) async fn replace<C, Id>(
    db: &Postgres<C>,
    table: Table,
    id: &Id,
    lines: &[Line],
) -> Result<(), Traced<database::Error>>
where
    C: Connection,
    Id: ToSql + Sync,
{
    let Table { name, owner } = table;

    let sql = format!(
        "DELETE FROM {name} \
         WHERE {owner} = $1::UUID",
    );
    _ = db.exec(&sql, &[id]).await.map_err(tracerr::wrap!())?;

    let sql = format!(
        "INSERT INTO {name} (\
             {owner}, position, \
             kind, designation, quantity, unit_price, vat_rate, \
             catalog_item_id\
         ) VALUES (\
             $1::UUID, $2::INT4, \
             $3::INT2, $4::VARCHAR, $5::NUMERIC, $6::NUMERIC, $7::NUMERIC, \
             $8::UUID\
         )",
    );
    for (position, line) in (0_i32..).zip(lines) {
        let Line {
            kind,
            designation,
            quantity,
            unit_price,
            vat_rate,
            catalog_item_id,
        } = line;
        _ = db
            .exec(
                &sql,
                &[
                    id,
                    &position,
                    kind,
                    designation,
                    quantity,
                    unit_price,
                    vat_rate,
                    catalog_item_id,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;
    }
    Ok(())
}

/// Splits the provided [`Discount`] into its storable parts.
pub(super) fn discount_parts(
    discount: Option<Discount>,
) -> (Option<DiscountKind>, Option<Decimal>) {
    discount.map_or((None, None), |d| (Some(d.kind()), Some(d.value())))
}

/// Restores a [`Discount`] from its stored parts.
pub(super) fn discount_from_parts(
    kind: Option<DiscountKind>,
    value: Option<Decimal>,
) -> Option<Discount> {
    Discount::from_parts(kind?, value?)
}
