#![allow(dead_code)]

use openflights::insert::insert_or_ignore;
use openflights_api::routes::airports::{AirportRequest, AirportResponse};
use openflights_store::models::{Airline, Airport};
use openflights_store::test_utils::{country, insert_country};

use crate::support::test_app::TestApp;

pub const DENMARK: i64 = 112;
pub const SWEDEN: i64 = 209;
pub const NORWAY: i64 = 161;

/// Inserts Denmark, Sweden and Norway.
pub async fn seed_countries(app: &TestApp) {
    for (country_id, name) in [(DENMARK, "Denmark"), (SWEDEN, "Sweden"), (NORWAY, "Norway")] {
        insert_country(&app.pool, &country(country_id, name)).await;
    }
}

/// Returns a create request holding only the required fields.
pub fn new_airport(airport_id: i64, name: &str, country_id: i64) -> AirportRequest {
    AirportRequest {
        airport_id: Some(airport_id),
        name: Some(name.to_string()),
        country_id: Some(country_id),
        ..AirportRequest::default()
    }
}

/// Returns a fully populated create request for Copenhagen Kastrup.
pub fn kastrup() -> AirportRequest {
    AirportRequest {
        airport_id: Some(609),
        name: Some("Copenhagen Kastrup Airport".to_string()),
        city: Some("Copenhagen".to_string()),
        country_id: Some(DENMARK),
        iata: Some("cph".to_string()),
        icao: Some("ekch".to_string()),
        latitude: Some("55.617900".to_string()),
        longitude: Some("12.656".to_string()),
        altitude_ft: Some(17),
        timezone_hrs: Some("1".to_string()),
        dst: Some("E".to_string()),
        tz: Some("Europe/Copenhagen".to_string()),
        kind: Some("airport".to_string()),
        source: Some("OurAirports".to_string()),
    }
}

/// Creates `airport` through the API and returns the stored row.
pub async fn create_airport(app: &TestApp, airport: &AirportRequest) -> AirportResponse {
    let response = app.create_airport(airport).await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    response
        .json()
        .await
        .expect("failed to deserialize response")
}

/// Returns an airline of `country_id` with only the required fields set.
pub fn airline(airline_id: i64, name: &str, country_id: i64) -> Airline {
    Airline {
        airline_id,
        name: name.to_string(),
        alias: None,
        iata: None,
        icao: None,
        callsign: None,
        country_id,
        active: None,
    }
}

/// Inserts `airlines` directly, since the API exposes no airline writes.
pub async fn insert_airlines(app: &TestApp, airlines: &[Airline]) {
    let mut connection = app
        .pool
        .acquire()
        .await
        .expect("failed to acquire connection");
    insert_or_ignore(&mut connection, airlines)
        .await
        .expect("failed to insert test airlines");
}

/// Inserts airports `1..=count` of `country_id` directly, without codes.
///
/// With `own_city` every airport gets a city of its own, `City 0001` and so on.
pub async fn insert_airports(app: &TestApp, count: i64, country_id: i64, own_city: bool) {
    let airports: Vec<Airport> = (1..=count)
        .map(|airport_id| Airport {
            airport_id,
            name: format!("Airport {airport_id}"),
            city: own_city.then(|| format!("City {airport_id:04}")),
            country_id,
            iata: None,
            icao: None,
            latitude: None,
            longitude: None,
            altitude_ft: None,
            timezone_hrs: None,
            dst: None,
            tz: None,
            kind: None,
            source: None,
        })
        .collect();

    let mut connection = app
        .pool
        .acquire()
        .await
        .expect("failed to acquire connection");
    insert_or_ignore(&mut connection, &airports)
        .await
        .expect("failed to insert test airports");
}
