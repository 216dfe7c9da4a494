//! Logging and metrics initialisation shared by the OpenFlights binaries and tests.

pub mod metrics;
pub mod tracing;
