use std::fmt;

use sqlx::{FromRow, SqliteExecutor};

/// Number of rows in each entity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct TableCounts {
    pub countries: i64,
    pub planes: i64,
    pub airports: i64,
    pub airlines: i64,
}

impl TableCounts {
    /// Total number of rows across all entity tables.
    pub fn total(&self) -> u64 {
        (self.countries + self.planes + self.airports + self.airlines) as u64
    }
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "countries={}, airports={}, airlines={}, planes={}, total={}",
            self.countries,
            self.airports,
            self.airlines,
            self.planes,
            self.total()
        )
    }
}

/// Counts the rows of every entity table in a single statement.
pub async fn count_rows<'c, E>(executor: E) -> Result<TableCounts, sqlx::Error>
where
    E: SqliteExecutor<'c>,
{
    sqlx::query_as::<_, TableCounts>(
        r#"
        select
            (select count(*) from countries) as countries,
            (select count(*) from planes) as planes,
            (select count(*) from airports) as airports,
            (select count(*) from airlines) as airlines
        "#,
    )
    .fetch_one(executor)
    .await
}
