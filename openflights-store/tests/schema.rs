use openflights_store::counts::{TableCounts, count_rows};
use openflights_store::models::Airport;
use openflights_store::test_utils::{country, create_test_pool, insert_country};

#[tokio::test(flavor = "multi_thread")]
async fn counts_start_at_zero() {
    let pool = create_test_pool().await;

    let counts = count_rows(&pool).await.unwrap();

    assert_eq!(counts, TableCounts::default());
    assert_eq!(counts.total(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn airports_require_an_existing_country() {
    let pool = create_test_pool().await;

    let result = sqlx::query("insert into airports (airport_id, name, country_id) values (1, 'Nowhere', 999)")
        .execute(&pool)
        .await;

    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn referenced_countries_cannot_be_deleted() {
    let pool = create_test_pool().await;
    insert_country(&pool, &country(112, "Denmark")).await;
    sqlx::query("insert into airports (airport_id, name, country_id) values (1001, 'Copenhagen Airport', 112)")
        .execute(&pool)
        .await
        .unwrap();

    let result = sqlx::query("delete from countries where country_id = 112")
        .execute(&pool)
        .await;

    assert!(result.is_err());
    let counts = count_rows(&pool).await.unwrap();
    assert_eq!(counts.countries, 1);
    assert_eq!(counts.airports, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn airport_decimals_keep_their_scale() {
    let pool = create_test_pool().await;
    insert_country(&pool, &country(112, "Denmark")).await;
    sqlx::query(
        "insert into airports (airport_id, name, country_id, latitude, timezone_hrs) values (1001, 'Copenhagen Airport', 112, '55.618100', '1.00')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let airport: Airport = sqlx::query_as("select * from airports where airport_id = 1001")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(airport.latitude.unwrap().to_string(), "55.618100");
    assert_eq!(airport.timezone_hrs.unwrap().to_string(), "1.00");
    assert_eq!(airport.longitude, None);
}
