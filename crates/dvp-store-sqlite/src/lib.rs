//! SQLite store for normalized petition data.
//!
//! [`load`] writes a whole input file into a fresh store; [`split_people`]
//! migrates an existing store in place after taking a backup. Both run on a
//! single synchronous connection.

mod people;
mod schema;

pub mod backup;
pub mod error;
pub mod load;
pub mod migrate;

pub use error::{Error, Result};
pub use load::{LoadReport, load, load_batch};
pub use migrate::{MigrationReport, split_people};
pub use schema::SCHEMA;

#[cfg(test)]
mod tests;
