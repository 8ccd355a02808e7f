//! [`Vehicle`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
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

/// Columns of a [`Vehicle`] row.
const COLUMNS: &str = "\
    id, client_id, plate, make, model, year, mileage, vin, created_at";

/// Maps the provided [`Row`] into a [`Vehicle`].
fn from_row(row: &Row) -> Vehicle {
    Vehicle {
        id: row.get("id"),
        client_id: row.get("client_id"),
        plate: row.get("plate"),
        make: row.get("make"),
        model: row.get("model"),
        year: row.get::<_, Option<i32>>("year").map(|y| {
            u16::try_from(y)
                .ok()
                .and_then(vehicle::Year::new)
                .expect("`year` overflow")
        }),
        mileage: row.get::<_, Option<i32>>("mileage").map(|km| {
            u32::try_from(km)
                .ok()
                .and_then(vehicle::Mileage::new)
                .expect("`mileage` overflow")
        }),
        vin: row.get("vin"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[vehicle::Id]>,
{
    type Ok = HashMap<vehicle::Id, Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<vehicle::Id, Vehicle>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[vehicle::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let limit = i32::try_from(ids.len()).unwrap_or(i32::MAX);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE id IN (SELECT unnest($1::UUID[]) LIMIT $2::INT4) \
             LIMIT $2::INT4",
        );
        Ok(self
            .query(&sql, &[&ids, &limit])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let vehicle = from_row(row);
                (vehicle.id, vehicle)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<vehicle::Id, Vehicle>, [vehicle::Id; 1]>>,
        Ok = HashMap<vehicle::Id, Vehicle>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<'l, C> Database<Select<By<Option<Vehicle>, &'l vehicle::Plate>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, &'l vehicle::Plate>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let plate: &'l vehicle::Plate = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE plate = $1::VARCHAR \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[plate])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Vehicle>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Vehicle>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(vehicle)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vehicle {
            id,
            client_id,
            plate,
            make,
            model,
            year,
            mileage,
            vin,
            created_at,
        } = vehicle;

        let year = year.map(|y| i32::from(u16::from(y)));
        let mileage = mileage
            .map(|km| i32::try_from(u32::from(km)))
            .transpose()
            .expect("`mileage` overflow");

        const SQL: &str = "\
            INSERT INTO vehicles (\
                id, client_id, plate, make, model, year, mileage, vin, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::INT4, $7::INT4, $8::VARCHAR, $9::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET client_id = EXCLUDED.client_id, \
                plate = EXCLUDED.plate, \
                make = EXCLUDED.make, \
                model = EXCLUDED.model, \
                year = EXCLUDED.year, \
                mileage = EXCLUDED.mileage, \
                vin = EXCLUDED.vin";
        self.exec(
            SQL,
            &[
                &id,
                &client_id,
                &plate,
                &make,
                &model,
                &year,
                &mileage,
                &vin,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Vehicle, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: vehicle::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM vehicles \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Vehicle, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: vehicle::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM vehicles \
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
        Select<By<read::vehicle::list::Page, read::vehicle::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::vehicle::list::Page, read::vehicle::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::vehicle::list::Selector {
            arguments,
            filter: read::vehicle::list::Filter { client_id, plate },
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

        let plate_pattern =
            plate.as_ref().map(|p| FuzzPattern::new(p.as_ref()));
        let plate_pattern_idx = plate_pattern.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let direction = arguments.direction();
        let sql = format!(
            "SELECT id \
             FROM vehicles \
             WHERE true \
                   {cursor} \
                   {client_filtering} \
                   {plate_filtering} \
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
            plate_filtering =
                plate_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND plate SIMILAR TO ${idx}::VARCHAR"))
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

        Ok(read::vehicle::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::vehicle::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::vehicle::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::vehicle::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM vehicles";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
