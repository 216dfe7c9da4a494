use openflights_config::Config;
use openflights_config::shared::{AdminConfig, DatabaseConfig, LoaderConfig, ValidationError};
use serde::Deserialize;

/// Complete configuration of the OpenFlights API service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// SQLite database holding the entity store.
    pub database: DatabaseConfig,
    /// Application server settings.
    pub application: ApplicationSettings,
    /// Bulk loader settings used by the `load` command.
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Administrative account provisioned by the `ensure-admin` command.
    #[serde(default)]
    pub admin: AdminConfig,
}

impl Config for ApiConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.loader.validate()
    }
}

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host address the API listens on.
    pub host: String,
    /// Port number the API listens on.
    pub port: u16,
}
