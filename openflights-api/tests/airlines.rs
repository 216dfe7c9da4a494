use openflights_api::routes::airlines::AirlineResponse;
use openflights_store::models::Airline;
use reqwest::StatusCode;

mod support;

use crate::support::mocks::{DENMARK, SWEDEN, airline, insert_airlines, seed_countries};
use crate::support::test_app::{TestApp, spawn_test_app};

async fn seed_airlines(app: &TestApp) {
    seed_countries(app).await;
    insert_airlines(
        app,
        &[
            Airline {
                iata: Some("SK".to_string()),
                icao: Some("SAS".to_string()),
                callsign: Some("SCANDINAVIAN".to_string()),
                active: Some("Y".to_string()),
                ..airline(4319, "Scandinavian Airlines System", SWEDEN)
            },
            Airline {
                iata: Some("DX".to_string()),
                icao: Some("DTR".to_string()),
                active: Some("Y".to_string()),
                ..airline(2087, "Danish Air Transport", DENMARK)
            },
            Airline {
                alias: Some("Sterling".to_string()),
                active: Some("N".to_string()),
                ..airline(4796, "Sterling Airlines", DENMARK)
            },
        ],
    )
    .await;
}

async fn airline_ids(app: &TestApp, query: &[(&str, &str)]) -> Vec<i64> {
    let response = app.read_all_airlines(query).await;
    assert_eq!(response.status(), StatusCode::OK);

    let airlines: Vec<AirlineResponse> = response
        .json()
        .await
        .expect("failed to deserialize response");
    airlines.into_iter().map(|a| a.airline_id).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn airlines_are_listed_by_id_with_their_country_name() {
    let app = spawn_test_app().await;
    seed_airlines(&app).await;

    let airlines: Vec<AirlineResponse> = app.read_all_airlines(&[]).await.json().await.unwrap();

    let ids: Vec<i64> = airlines.iter().map(|a| a.airline_id).collect();
    assert_eq!(ids, [2087, 4319, 4796]);
    assert_eq!(airlines[1].country_name, "Sweden");
    assert_eq!(airlines[1].callsign.as_deref(), Some("SCANDINAVIAN"));
    assert_eq!(airlines[2].alias.as_deref(), Some("Sterling"));
}

#[tokio::test(flavor = "multi_thread")]
async fn airlines_can_be_filtered() {
    let app = spawn_test_app().await;
    seed_airlines(&app).await;

    let denmark_id = DENMARK.to_string();
    assert_eq!(
        airline_ids(&app, &[("country_id", denmark_id.as_str())]).await,
        [2087, 4796]
    );
    assert_eq!(airline_ids(&app, &[("active", "y")]).await, [2087, 4319]);
    assert_eq!(airline_ids(&app, &[("iata", "sk")]).await, [4319]);
    assert_eq!(airline_ids(&app, &[("icao", "dtr")]).await, [2087]);
    assert_eq!(airline_ids(&app, &[("q", "AIR")]).await, [2087, 4319, 4796]);
    assert_eq!(
        airline_ids(&app, &[("q", "airlines"), ("active", "N")]).await,
        [4796]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn non_integer_country_filter_is_rejected() {
    let app = spawn_test_app().await;

    let response = app.read_all_airlines(&[("country_id", "1.5")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
