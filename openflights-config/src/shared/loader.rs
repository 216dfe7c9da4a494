use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Default directory holding the CSV sources.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default ceiling on the total number of rows across all entity tables.
pub const DEFAULT_MAX_TOTAL_ROWS: u64 = 10_000;

/// Configuration of the CSV bulk loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoaderConfig {
    /// Directory containing `countries.csv`, `planes.csv`, `airports.csv` and `airlines.csv`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Maximum number of rows allowed across all tables once a load finishes.
    #[serde(default = "default_max_total_rows")]
    pub max_total_rows: u64,
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_total_rows == 0 {
            return Err(ValidationError::MaxTotalRowsZero);
        }

        Ok(())
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_total_rows: default_max_total_rows(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

const fn default_max_total_rows() -> u64 {
    DEFAULT_MAX_TOTAL_ROWS
}
