use std::path::PathBuf;

use metrics::counter;
use openflights_config::shared::LoaderConfig;
use openflights_store::counts::{TableCounts, count_rows};
use openflights_store::models::{Airline, Airport, Country, Plane};
use openflights_telemetry::metrics::{
    ENTITY_LABEL, OPENFLIGHTS_BULK_LOADS_TOTAL, OPENFLIGHTS_ROWS_INSERTED_TOTAL,
    OPENFLIGHTS_ROWS_SKIPPED_TOTAL, OUTCOME_LABEL,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, warn};

use crate::error::{LoadError, LoadResult};
use crate::insert::{InsertRow, insert_or_ignore};
use crate::source::{ParsedSource, SourcePaths, SourceRow, read_source};

/// Options of a single bulk load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Directory containing the four CSV sources.
    pub data_dir: PathBuf,
    /// Deletes every entity row before inserting.
    pub clear: bool,
    /// Maximum number of rows allowed across all tables once the load finishes.
    pub max_total_rows: u64,
}

impl LoadOptions {
    pub fn from_config(config: &LoaderConfig, clear: bool) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            clear,
            max_total_rows: config.max_total_rows,
        }
    }
}

/// What happened to the rows of one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityLoadStats {
    /// Data rows read from the source.
    pub read: u64,
    /// Rows dropped before insertion because their country reference was unusable.
    pub skipped: u64,
    /// Rows actually inserted. Rows whose primary key already existed are not counted.
    pub inserted: u64,
}

impl EntityLoadStats {
    /// Rows that were built but already present in the table.
    pub fn existing(&self) -> u64 {
        self.read - self.skipped - self.inserted
    }
}

/// Outcome of a committed bulk load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub countries: EntityLoadStats,
    pub planes: EntityLoadStats,
    pub airports: EntityLoadStats,
    pub airlines: EntityLoadStats,
    /// Row counts of every table after the load.
    pub counts: TableCounts,
}

/// Rows of all four sources, parsed ahead of any database write.
struct Dataset {
    countries: ParsedSource<Country>,
    planes: ParsedSource<Plane>,
    airports: ParsedSource<Airport>,
    airlines: ParsedSource<Airline>,
}

impl Dataset {
    async fn read(paths: &SourcePaths) -> LoadResult<Self> {
        Ok(Self {
            countries: read_source(paths).await?,
            planes: read_source(paths).await?,
            airports: read_source(paths).await?,
            airlines: read_source(paths).await?,
        })
    }
}

/// Loads the CSV dataset found in `options.data_dir`.
///
/// All sources are checked and parsed before the database is touched. The writes then happen in
/// one transaction: rows whose primary key already exists are left untouched, and the whole load
/// is rolled back when any statement fails or when the tables would end up holding more than
/// `options.max_total_rows` rows.
pub async fn load(pool: &SqlitePool, options: &LoadOptions) -> LoadResult<LoadSummary> {
    let result = load_dataset(pool, options).await;

    match &result {
        Ok(summary) => {
            counter!(OPENFLIGHTS_BULK_LOADS_TOTAL, OUTCOME_LABEL => "success").increment(1);
            info!(counts = %summary.counts, "bulk load committed");
        }
        Err(err) => {
            counter!(OPENFLIGHTS_BULK_LOADS_TOTAL, OUTCOME_LABEL => err.outcome()).increment(1);
            error!(error = %err, "bulk load failed, no changes were committed");
        }
    }

    result
}

async fn load_dataset(pool: &SqlitePool, options: &LoadOptions) -> LoadResult<LoadSummary> {
    let paths = SourcePaths::resolve(&options.data_dir)?;
    let dataset = Dataset::read(&paths).await?;

    info!(
        data_dir = %options.data_dir.display(),
        countries = dataset.countries.rows.len(),
        planes = dataset.planes.rows.len(),
        airports = dataset.airports.rows.len(),
        airlines = dataset.airlines.rows.len(),
        "parsed csv sources"
    );

    let mut transaction = openflights_store::begin_write(pool).await?;

    if options.clear {
        clear_entities(&mut transaction).await?;
    }

    let countries = insert_source(&mut transaction, &dataset.countries).await?;
    let planes = insert_source(&mut transaction, &dataset.planes).await?;
    let airports = insert_source(&mut transaction, &dataset.airports).await?;
    let airlines = insert_source(&mut transaction, &dataset.airlines).await?;

    let counts = count_rows(&mut *transaction).await?;
    if counts.total() > options.max_total_rows {
        warn!(%counts, limit = options.max_total_rows, "row limit exceeded, rolling back");
        transaction.rollback().await?;

        return Err(LoadError::CapacityExceeded {
            total: counts.total(),
            limit: options.max_total_rows,
        });
    }

    transaction.commit().await?;

    let summary = LoadSummary {
        countries,
        planes,
        airports,
        airlines,
        counts,
    };
    record_metrics(&summary);

    Ok(summary)
}

/// Deletes all entity rows, dependents before the countries they reference.
async fn clear_entities(connection: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for table in [Airport::TABLE, Airline::TABLE, Plane::TABLE, Country::TABLE] {
        let deleted = sqlx::query(&format!("delete from {table}"))
            .execute(&mut *connection)
            .await?
            .rows_affected();
        info!(table, deleted, "cleared table");
    }

    Ok(())
}

async fn insert_source<T>(
    connection: &mut SqliteConnection,
    source: &ParsedSource<T>,
) -> Result<EntityLoadStats, sqlx::Error>
where
    T: SourceRow + InsertRow,
{
    let inserted = insert_or_ignore(connection, &source.rows).await?;
    let stats = EntityLoadStats {
        read: (source.rows.len() + source.skipped) as u64,
        skipped: source.skipped as u64,
        inserted,
    };

    info!(
        entity = T::SOURCE.entity(),
        read = stats.read,
        inserted = stats.inserted,
        skipped = stats.skipped,
        existing = stats.existing(),
        "inserted source rows"
    );

    Ok(stats)
}

fn record_metrics(summary: &LoadSummary) {
    let entities = [
        (Country::TABLE, summary.countries),
        (Plane::TABLE, summary.planes),
        (Airport::TABLE, summary.airports),
        (Airline::TABLE, summary.airlines),
    ];

    for (entity, stats) in entities {
        counter!(OPENFLIGHTS_ROWS_INSERTED_TOTAL, ENTITY_LABEL => entity).increment(stats.inserted);
        counter!(OPENFLIGHTS_ROWS_SKIPPED_TOTAL, ENTITY_LABEL => entity)
            .increment(stats.skipped + stats.existing());
    }
}
