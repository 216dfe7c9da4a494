//! Bulk loading of the OpenFlights CSV dataset into the entity store.
//!
//! The loader reads `countries.csv`, `planes.csv`, `airports.csv` and `airlines.csv`, turns every
//! row into a typed entity through the [`normalize`] helpers and inserts all of them inside a
//! single transaction, skipping rows whose primary key already exists.

pub mod error;
pub mod insert;
pub mod load;
pub mod normalize;
pub mod rows;
pub mod source;

pub use error::{LoadError, LoadResult};
pub use load::{EntityLoadStats, LoadOptions, LoadSummary, load};
