mod admin;
mod base;
mod database;
mod loader;

pub use admin::*;
pub use base::*;
pub use database::*;
pub use loader::*;
