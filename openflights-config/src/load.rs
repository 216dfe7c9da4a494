use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;
use crate::shared::ValidationError;

/// Directory, relative to the working directory, that holds the configuration layers.
const CONFIGURATION_DIR: &str = "configuration";

/// Stem of the layer every environment starts from.
const BASE_LAYER: &str = "base";

/// Extensions tried for each layer, in order.
const LAYER_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Environment variables starting with `APP_` override file values, e.g. `APP_DATABASE__PATH`.
const ENV_OVERRIDE_PREFIX: &str = "APP";
const ENV_OVERRIDE_NESTING: &str = "__";

/// Implemented by top level configuration structures loaded through [`load_config`].
pub trait Config {
    /// Checks invariants that deserialization alone cannot express.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to determine the working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    #[error("failed to determine runtime environment: {0}")]
    Environment(#[from] io::Error),

    #[error("configuration directory `{}` does not exist", .0.display())]
    NoConfigurationDirectory(PathBuf),

    #[error("no `{layer}` configuration in `{}`, expected one of {layer}.yaml, {layer}.yml or {layer}.json", .directory.display())]
    LayerNotFound { layer: String, directory: PathBuf },

    #[error("configuration file `{}` is invalid: {source}", .path.display())]
    InvalidLayer {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("failed to merge configuration layers: {0}")]
    Merge(#[source] config::ConfigError),

    #[error("configuration does not match the expected shape: {0}")]
    Shape(#[source] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
}

/// Loads configuration from `configuration/` in the working directory for the environment
/// named by `APP_ENVIRONMENT`.
pub fn load_config<T>() -> Result<T, LoadConfigError>
where
    T: Config + DeserializeOwned,
{
    let working_directory = std::env::current_dir().map_err(LoadConfigError::WorkingDirectory)?;
    let environment = Environment::load()?;

    load_config_from(&working_directory.join(CONFIGURATION_DIR), environment)
}

/// Loads configuration layers from `directory`.
///
/// The base layer is read first, then the layer named after `environment`, then `APP_`
/// environment overrides. Each file is parsed on its own first so that a broken file is
/// reported by path.
pub fn load_config_from<T>(directory: &Path, environment: Environment) -> Result<T, LoadConfigError>
where
    T: Config + DeserializeOwned,
{
    if !directory.is_dir() {
        return Err(LoadConfigError::NoConfigurationDirectory(
            directory.to_path_buf(),
        ));
    }

    let mut builder = config::Config::builder();
    for layer in [BASE_LAYER, environment.as_str()] {
        let path = layer_path(directory, layer)?;
        check_layer(&path)?;
        builder = builder.add_source(config::File::from(path));
    }

    let overrides = config::Environment::with_prefix(ENV_OVERRIDE_PREFIX)
        .prefix_separator("_")
        .separator(ENV_OVERRIDE_NESTING)
        .try_parsing(true);

    let config: T = builder
        .add_source(overrides)
        .build()
        .map_err(LoadConfigError::Merge)?
        .try_deserialize()
        .map_err(LoadConfigError::Shape)?;
    config.validate()?;

    Ok(config)
}

/// Returns the first existing file of `layer` in `directory`.
fn layer_path(directory: &Path, layer: &str) -> Result<PathBuf, LoadConfigError> {
    LAYER_EXTENSIONS
        .iter()
        .map(|extension| directory.join(format!("{layer}.{extension}")))
        .find(|path| path.is_file())
        .ok_or_else(|| LoadConfigError::LayerNotFound {
            layer: layer.to_string(),
            directory: directory.to_path_buf(),
        })
}

fn check_layer(path: &Path) -> Result<(), LoadConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .map(|_| ())
        .map_err(|source| LoadConfigError::InvalidLayer {
            path: path.to_path_buf(),
            source,
        })
}
