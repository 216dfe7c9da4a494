use openflights_store::decimal;
use openflights_store::models::{Airline, Airport, Country, Plane};
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Upper bound on bind parameters per statement, the limit of SQLite builds older than 3.32.
const MAX_BIND_PARAMETERS: usize = 999;

/// An entity that can be bulk inserted into its table.
pub trait InsertRow {
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str;
    /// Inserted columns, in the order [`InsertRow::push_binds`] binds them.
    const COLUMNS: &'static [&'static str];

    fn push_binds<'args>(&'args self, values: &mut Separated<'_, 'args, Sqlite, &'static str>);
}

/// Inserts `rows`, silently skipping rows whose primary key already exists.
///
/// Returns the number of rows actually inserted. Existing rows are never overwritten.
pub async fn insert_or_ignore<T>(
    connection: &mut SqliteConnection,
    rows: &[T],
) -> Result<u64, sqlx::Error>
where
    T: InsertRow,
{
    let rows_per_statement = (MAX_BIND_PARAMETERS / T::COLUMNS.len()).max(1);
    let mut inserted = 0;

    for chunk in rows.chunks(rows_per_statement) {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "insert into {} ({}) ",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        builder.push_values(chunk, |mut values, row| row.push_binds(&mut values));
        builder.push(format!(" on conflict ({}) do nothing", T::PRIMARY_KEY));

        inserted += builder
            .build()
            .execute(&mut *connection)
            .await?
            .rows_affected();
    }

    Ok(inserted)
}

impl InsertRow for Country {
    const TABLE: &'static str = "countries";
    const PRIMARY_KEY: &'static str = "country_id";
    const COLUMNS: &'static [&'static str] = &["country_id", "name", "iso2", "dafif"];

    fn push_binds<'args>(&'args self, values: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        values
            .push_bind(self.country_id)
            .push_bind(self.name.as_str())
            .push_bind(self.iso2.as_deref())
            .push_bind(self.dafif.as_deref());
    }
}

impl InsertRow for Plane {
    const TABLE: &'static str = "planes";
    const PRIMARY_KEY: &'static str = "plane_id";
    const COLUMNS: &'static [&'static str] = &["plane_id", "name", "iata", "icao"];

    fn push_binds<'args>(&'args self, values: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        values
            .push_bind(self.plane_id)
            .push_bind(self.name.as_str())
            .push_bind(self.iata.as_deref())
            .push_bind(self.icao.as_deref());
    }
}

impl InsertRow for Airport {
    const TABLE: &'static str = "airports";
    const PRIMARY_KEY: &'static str = "airport_id";
    const COLUMNS: &'static [&'static str] = &[
        "airport_id",
        "name",
        "city",
        "country_id",
        "iata",
        "icao",
        "latitude",
        "longitude",
        "altitude_ft",
        "timezone_hrs",
        "dst",
        "tz",
        "type",
        "source",
    ];

    fn push_binds<'args>(&'args self, values: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        values
            .push_bind(self.airport_id)
            .push_bind(self.name.as_str())
            .push_bind(self.city.as_deref())
            .push_bind(self.country_id)
            .push_bind(self.iata.as_deref())
            .push_bind(self.icao.as_deref())
            .push_bind(decimal::encode(self.latitude.as_ref()))
            .push_bind(decimal::encode(self.longitude.as_ref()))
            .push_bind(self.altitude_ft)
            .push_bind(decimal::encode(self.timezone_hrs.as_ref()))
            .push_bind(self.dst.as_deref())
            .push_bind(self.tz.as_deref())
            .push_bind(self.kind.as_deref())
            .push_bind(self.source.as_deref());
    }
}

impl InsertRow for Airline {
    const TABLE: &'static str = "airlines";
    const PRIMARY_KEY: &'static str = "airline_id";
    const COLUMNS: &'static [&'static str] = &[
        "airline_id",
        "name",
        "alias",
        "iata",
        "icao",
        "callsign",
        "country_id",
        "active",
    ];

    fn push_binds<'args>(&'args self, values: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        values
            .push_bind(self.airline_id)
            .push_bind(self.name.as_str())
            .push_bind(self.alias.as_deref())
            .push_bind(self.iata.as_deref())
            .push_bind(self.icao.as_deref())
            .push_bind(self.callsign.as_deref())
            .push_bind(self.country_id)
            .push_bind(self.active.as_deref());
    }
}
