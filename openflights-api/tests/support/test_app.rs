#![allow(dead_code)]

use std::io;
use std::net::TcpListener;

use openflights_api::startup::run;
use openflights_config::Environment;
use openflights_config::shared::DatabaseConfig;
use openflights_store::connect_and_migrate;
use openflights_store::test_utils::create_test_pool;
use reqwest::{IntoUrl, RequestBuilder};
use serde::Serialize;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    /// Pool shared with the server, used to seed and inspect the database.
    pub pool: SqlitePool,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
    /// Keeps the directory of a file-backed database alive until the app is dropped.
    _data_dir: Option<TempDir>,
}

impl TestApp {
    fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.api_client.get(url)
    }

    pub async fn health_check(&self) -> reqwest::Response {
        self.get(format!("{}/health_check", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn metrics(&self) -> reqwest::Response {
        self.get(format!("{}/metrics", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn openapi(&self) -> reqwest::Response {
        self.get(format!("{}/api-docs/openapi.json", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_all_airports(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.get(format!("{}/airports", &self.address))
            .query(query)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_airports_missing_codes(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.get(format!("{}/airports/missing-codes", &self.address))
            .query(query)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn create_airport<T: Serialize + ?Sized>(&self, airport: &T) -> reqwest::Response {
        self.api_client
            .post(format!("{}/airports", &self.address))
            .json(airport)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_airport_raw(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(format!("{}/airports", &self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn read_airport(&self, airport_id: i64) -> reqwest::Response {
        self.get(format!("{}/airports/{airport_id}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn replace_airport<T: Serialize + ?Sized>(
        &self,
        airport_id: i64,
        airport: &T,
    ) -> reqwest::Response {
        self.api_client
            .put(format!("{}/airports/{airport_id}", &self.address))
            .json(airport)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn update_airport<T: Serialize + ?Sized>(
        &self,
        airport_id: i64,
        airport: &T,
    ) -> reqwest::Response {
        self.api_client
            .patch(format!("{}/airports/{airport_id}", &self.address))
            .json(airport)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_airport(&self, airport_id: i64) -> reqwest::Response {
        self.api_client
            .delete(format!("{}/airports/{airport_id}", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn read_all_airlines(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.get(format!("{}/airlines", &self.address))
            .query(query)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_all_countries(&self, query: &[(&str, &str)]) -> reqwest::Response {
        self.get(format!("{}/countries", &self.address))
            .query(query)
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn read_city_airport_counts(&self, country_id: i64) -> reqwest::Response {
        self.get(format!(
            "{}/countries/{country_id}/city-airport-counts",
            &self.address
        ))
        .send()
        .await
        .expect("failed to execute request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_test_app() -> TestApp {
    let pool = create_test_pool().await;

    spawn_with_pool(pool, None).await
}

/// Spawns an app on a database file with a pool of `max_connections`.
pub async fn spawn_file_backed_test_app(max_connections: u32) -> TestApp {
    let data_dir = tempfile::tempdir().expect("failed to create database dir");
    let database = DatabaseConfig {
        path: data_dir
            .path()
            .join("openflights.sqlite3")
            .to_string_lossy()
            .into_owned(),
        max_connections,
        create_if_missing: true,
    };
    let pool = connect_and_migrate(&database)
        .await
        .expect("failed to create the test database");

    spawn_with_pool(pool, Some(data_dir)).await
}

async fn spawn_with_pool(pool: SqlitePool, data_dir: Option<TempDir>) -> TestApp {
    Environment::Dev.set();

    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, pool.clone())
        .await
        .expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        pool,
        server_handle,
        _data_dir: data_dir,
    }
}
