pub mod admin;
pub mod config;
pub mod db;
pub mod request_logging;
pub mod routes;
pub mod startup;
pub mod utils;
pub mod validation;
