use std::fs;
use std::path::Path;

use openflights::{LoadError, LoadOptions, load};
use openflights_store::counts::{TableCounts, count_rows};
use openflights_store::models::Airport;
use openflights_store::test_utils::create_test_pool;
use tempfile::TempDir;

const COUNTRIES_CSV: &str = "\
country_id,name,iso2,dafif
112,Denmark,DK,DA
113,Sweden,SE,SW
";

const PLANES_CSV: &str = "\
plane_id,name,iata,icao
1,Airbus A320,320,A320
2,Boeing 737-800,738,\\N
";

const AIRPORTS_CSV: &str = "\
airport_id,name,city,country_id,iata,icao,latitude,longitude,altitude_ft,timezone_hrs,dst,tz,type,source
609,Copenhagen Kastrup Airport,Copenhagen,112,CPH,EKCH,55.617900848389,12.656000137329,17,1,E,Europe/Copenhagen,airport,OurAirports
737,Stockholm-Arlanda Airport,Stockholm,113,ARN,ESSA,59.651901245117,17.918600082397,137,1,E,Europe/Stockholm,airport,OurAirports
";

const AIRLINES_CSV: &str = "\
airline_id,name,alias,iata,icao,callsign,country_id,active
1,Scandinavian Airlines,\\N,SK,SAS,SCANDINAVIAN,113,Y
2,Orphan Air,\\N,,,,\\N,N
";

struct Dataset {
    dir: TempDir,
}

impl Dataset {
    fn new(countries: &str, planes: &str, airports: &str, airlines: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create data dir");
        for (file, contents) in [
            ("countries.csv", countries),
            ("planes.csv", planes),
            ("airports.csv", airports),
            ("airlines.csv", airlines),
        ] {
            fs::write(dir.path().join(file), contents).expect("failed to write source");
        }

        Self { dir }
    }

    fn full() -> Self {
        Self::new(COUNTRIES_CSV, PLANES_CSV, AIRPORTS_CSV, AIRLINES_CSV)
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn options(&self) -> LoadOptions {
        LoadOptions {
            data_dir: self.path().to_path_buf(),
            clear: false,
            max_total_rows: 10_000,
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn load_inserts_every_source_in_one_go() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();

    let summary = load(&pool, &dataset.options()).await.unwrap();

    assert_eq!(summary.countries.inserted, 2);
    assert_eq!(summary.planes.inserted, 2);
    assert_eq!(summary.airports.inserted, 2);
    assert_eq!(summary.airlines.read, 2);
    assert_eq!(summary.airlines.skipped, 1);
    assert_eq!(summary.airlines.inserted, 1);
    assert_eq!(
        summary.counts,
        TableCounts {
            countries: 2,
            planes: 2,
            airports: 2,
            airlines: 1,
        }
    );

    let airport: Airport = sqlx::query_as("select * from airports where airport_id = 609")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(airport.latitude.unwrap().to_string(), "55.617901");
    assert_eq!(airport.longitude.unwrap().to_string(), "12.656000");
    assert_eq!(airport.timezone_hrs.unwrap().to_string(), "1.00");
    assert_eq!(airport.kind.as_deref(), Some("airport"));
}

#[tokio::test(flavor = "multi_thread")]
async fn reloading_the_same_sources_inserts_nothing() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();

    let first = load(&pool, &dataset.options()).await.unwrap();
    let second = load(&pool, &dataset.options()).await.unwrap();

    assert_eq!(second.countries.inserted, 0);
    assert_eq!(second.planes.inserted, 0);
    assert_eq!(second.airports.inserted, 0);
    assert_eq!(second.airlines.inserted, 0);
    assert_eq!(second.airports.existing(), 2);
    assert_eq!(first.counts, second.counts);
}

#[tokio::test(flavor = "multi_thread")]
async fn existing_rows_are_not_overwritten() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();
    load(&pool, &dataset.options()).await.unwrap();

    let renamed = Dataset::new(
        "country_id,name,iso2,dafif\n112,Kingdom of Denmark,DK,DA\n",
        "",
        "",
        "",
    );
    let summary = load(&pool, &renamed.options()).await.unwrap();
    assert_eq!(summary.countries.inserted, 0);

    let name: String = sqlx::query_scalar("select name from countries where country_id = 112")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Denmark");
}

#[tokio::test(flavor = "multi_thread")]
async fn single_country_with_one_airport_and_empty_sources() {
    let pool = create_test_pool().await;
    let dataset = Dataset::new(
        "country_id,name,iso2,dafif\n112,Denmark,DK,DA\n",
        "",
        "airport_id,name,city,country_id,iata,icao\n609,Kastrup,Copenhagen,112,CPH,EKCH\n",
        "",
    );

    let summary = load(&pool, &dataset.options()).await.unwrap();

    assert_eq!(
        summary.counts,
        TableCounts {
            countries: 1,
            planes: 0,
            airports: 1,
            airlines: 0,
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_source_fails_before_any_mutation() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();
    fs::remove_file(dataset.path().join("airlines.csv")).unwrap();

    let err = load(&pool, &dataset.options()).await.unwrap_err();

    assert!(matches!(err, LoadError::MissingSource(ref path) if path.ends_with("airlines.csv")));
    assert_eq!(
        err.to_string(),
        format!(
            "Missing file: {}",
            dataset.path().join("airlines.csv").display()
        )
    );
    assert_eq!(count_rows(&pool).await.unwrap(), TableCounts::default());
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_replaces_previous_rows() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();
    load(&pool, &dataset.options()).await.unwrap();

    let replacement = Dataset::new("country_id,name\n1,Iceland\n", "", "", "");
    let mut options = replacement.options();
    options.clear = true;
    let summary = load(&pool, &options).await.unwrap();

    assert_eq!(
        summary.counts,
        TableCounts {
            countries: 1,
            planes: 0,
            airports: 0,
            airlines: 0,
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn exceeding_the_row_limit_rolls_back_the_load() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();
    let mut options = dataset.options();
    // Seven rows are loaded.
    options.max_total_rows = 6;

    let err = load(&pool, &options).await.unwrap_err();

    assert!(matches!(err, LoadError::CapacityExceeded { total: 7, limit: 6 }));
    assert_eq!(err.to_string(), "Total rows 7 exceeds 6 limit. Reduce dataset.");
    assert_eq!(count_rows(&pool).await.unwrap(), TableCounts::default());

    options.max_total_rows = 7;
    let summary = load(&pool, &options).await.unwrap();
    assert_eq!(summary.counts.total(), 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn exceeding_the_row_limit_keeps_the_previous_state() {
    let pool = create_test_pool().await;
    let dataset = Dataset::full();
    let mut options = dataset.options();
    let before = load(&pool, &options).await.unwrap().counts;

    let extra = Dataset::new("country_id,name\n1,Iceland\n", "", "", "");
    options.data_dir = extra.path().to_path_buf();
    options.max_total_rows = before.total();

    let err = load(&pool, &options).await.unwrap_err();

    assert!(matches!(err, LoadError::CapacityExceeded { .. }));
    assert_eq!(count_rows(&pool).await.unwrap(), before);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_country_reference_aborts_the_load() {
    let pool = create_test_pool().await;
    let dataset = Dataset::new(
        COUNTRIES_CSV,
        PLANES_CSV,
        "airport_id,name,city,country_id\n1,Nowhere Field,Nowhere,999\n",
        "",
    );

    let err = load(&pool, &dataset.options()).await.unwrap_err();

    assert!(matches!(err, LoadError::Database(_)));
    assert_eq!(count_rows(&pool).await.unwrap(), TableCounts::default());
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_primary_key_aborts_the_load() {
    let pool = create_test_pool().await;
    let dataset = Dataset::new(COUNTRIES_CSV, "plane_id,name\nabc,Concorde\n", "", "");

    let err = load(&pool, &dataset.options()).await.unwrap_err();

    assert!(matches!(
        err,
        LoadError::MalformedField {
            file: "planes.csv",
            line: 2,
            column: "plane_id",
            ..
        }
    ));
    assert_eq!(count_rows(&pool).await.unwrap(), TableCounts::default());
}
