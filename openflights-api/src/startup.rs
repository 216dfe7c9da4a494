use std::net::TcpListener;

use actix_web::{
    App, HttpRequest, HttpResponse, Responder, dev::Server, error::InternalError, get,
    http::StatusCode, web,
};
use openflights::{LoadOptions, LoadSummary};
use openflights_config::shared::DatabaseConfig;
use openflights_store::connect_and_migrate;
use openflights_telemetry::metrics::init_metrics_handle;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::OpenApi;

use crate::admin::{AdminProvisioning, ensure_admin};
use crate::config::ApiConfig;
use crate::db::airports::CityAirportCount;
use crate::db::countries::CountryWithCounts;
use crate::request_logging::RequestLogging;
use crate::routes::{
    ErrorMessage,
    airlines::{AirlineResponse, read_all_airlines},
    airports::{
        AirportRequest, AirportResponse, create_airport, delete_airport, read_airport,
        read_airports_missing_codes, read_all_airports, replace_airport, update_airport,
    },
    countries::{read_all_countries, read_city_airport_counts},
    error_message_response,
    health_check::health_check,
    metrics::metrics,
};
use crate::validation::FieldErrors;

/// OpenFlights API application server wrapper.
///
/// Manages the HTTP server lifecycle including startup, migration, and shutdown.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Opens the database, brings its schema up to date and binds the HTTP server.
    pub async fn build(config: ApiConfig) -> anyhow::Result<Self> {
        let connection_pool = connect_and_migrate(&config.database).await?;

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, connection_pool).await?;

        Ok(Self { port, server })
    }

    /// Applies all pending migrations from the store's embedded migrations.
    pub async fn migrate_database(config: &DatabaseConfig) -> anyhow::Result<()> {
        let connection_pool = connect_and_migrate(config).await?;
        connection_pool.close().await;

        Ok(())
    }

    /// Runs a bulk load of the CSV dataset described by `options`.
    pub async fn load_dataset(
        config: &DatabaseConfig,
        options: &LoadOptions,
    ) -> anyhow::Result<LoadSummary> {
        let connection_pool = connect_and_migrate(config).await?;
        let summary = openflights::load(&connection_pool, options).await;
        connection_pool.close().await;

        Ok(summary?)
    }

    /// Creates or refreshes the configured administrator account.
    pub async fn ensure_admin(config: &ApiConfig) -> anyhow::Result<AdminProvisioning> {
        let connection_pool = connect_and_migrate(&config.database).await?;
        let provisioning = ensure_admin(&connection_pool, &config.admin).await;
        connection_pool.close().await;

        Ok(provisioning?)
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Runs the server until it receives a shutdown signal.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check::health_check,
        crate::routes::metrics::metrics,
        crate::routes::airports::read_all_airports,
        crate::routes::airports::read_airports_missing_codes,
        crate::routes::airports::create_airport,
        crate::routes::airports::read_airport,
        crate::routes::airports::replace_airport,
        crate::routes::airports::update_airport,
        crate::routes::airports::delete_airport,
        crate::routes::airlines::read_all_airlines,
        crate::routes::countries::read_all_countries,
        crate::routes::countries::read_city_airport_counts,
    ),
    components(schemas(
        AirportRequest,
        AirportResponse,
        AirlineResponse,
        CountryWithCounts,
        CityAirportCount,
        FieldErrors,
        ErrorMessage,
    ))
)]
pub struct ApiDoc;

#[get("/api-docs/openapi.json")]
async fn openapi_json(openapi: web::Data<utoipa::openapi::OpenApi>) -> impl Responder {
    HttpResponse::Ok().json(&**openapi)
}

/// Turns unreadable JSON bodies into a `400` carrying an error message.
fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    let response = error_message_response(StatusCode::BAD_REQUEST, err.to_string());
    InternalError::from_response(err, response).into()
}

/// Creates and configures the HTTP server with all routes and middleware.
pub async fn run(
    listener: TcpListener,
    connection_pool: SqlitePool,
) -> Result<Server, anyhow::Error> {
    let prometheus_handle = web::ThinData(init_metrics_handle()?);
    let openapi = web::Data::new(ApiDoc::openapi());
    let connection_pool = web::Data::new(connection_pool);

    info!(address = %listener.local_addr()?, "starting openflights api");

    let server = actix_web::HttpServer::new(move || {
        App::new()
            .wrap(RequestLogging)
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(health_check)
            .service(metrics)
            .service(openapi_json)
            // airports, `missing-codes` must be registered before `{airport_id}`
            .service(read_all_airports)
            .service(read_airports_missing_codes)
            .service(create_airport)
            .service(read_airport)
            .service(replace_airport)
            .service(update_airport)
            .service(delete_airport)
            // airlines
            .service(read_all_airlines)
            // countries
            .service(read_all_countries)
            .service(read_city_airport_counts)
            .app_data(prometheus_handle.clone())
            .app_data(openapi.clone())
            .app_data(connection_pool.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
