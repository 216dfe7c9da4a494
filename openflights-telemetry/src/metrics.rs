//! Metric names and the Prometheus recorder used by the OpenFlights services.

use std::{sync::Mutex, time::Duration};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::trace;

/// Label for the entity table a metric refers to.
pub const ENTITY_LABEL: &str = "entity";

/// Label for the outcome of an operation.
pub const OUTCOME_LABEL: &str = "outcome";

/// Label for the kind of mutation applied to a row.
pub const OPERATION_LABEL: &str = "operation";

/// Counter for rows inserted by the bulk loader.
pub const OPENFLIGHTS_ROWS_INSERTED_TOTAL: &str = "openflights_rows_inserted_total";

/// Counter for source rows the bulk loader skipped, either on a duplicate key or a missing country reference.
pub const OPENFLIGHTS_ROWS_SKIPPED_TOTAL: &str = "openflights_rows_skipped_total";

/// Counter for finished bulk loads.
pub const OPENFLIGHTS_BULK_LOADS_TOTAL: &str = "openflights_bulk_loads_total";

/// Counter for airport rows created, updated or deleted through the API.
pub const OPENFLIGHTS_AIRPORT_MUTATIONS_TOTAL: &str = "openflights_airport_mutations_total";

/// Interval between two upkeep runs of the recorder.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

// The recorder is global and can be installed only once, while tests build many servers.
static PROMETHEUS_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Installs the Prometheus recorder on first use and returns a handle for rendering.
///
/// Later calls return clones of the cached handle. The first call must happen inside a Tokio
/// runtime because it spawns the upkeep task.
pub fn init_metrics_handle() -> Result<PrometheusHandle, BuildError> {
    let mut prometheus_handle = PROMETHEUS_HANDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(handle) = &*prometheus_handle {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    *prometheus_handle = Some(handle.clone());

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(UPKEEP_INTERVAL).await;
            trace!("running metrics upkeep");
            upkeep_handle.run_upkeep();
        }
    });

    Ok(handle)
}
