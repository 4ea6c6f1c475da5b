//! Core types for the divorce-petition pipeline.
//!
//! This crate is deliberately free of file and database dependencies. It holds
//! the row type read from the source CSV, the People identity triple, the
//! list-splitting rules shared by every table, and the pure normalization pass
//! that turns rows into dimension and junction lists.

pub mod error;
pub mod normalize;
pub mod person;
pub mod policy;
pub mod record;
pub mod tokens;

pub use error::{Error, Result};
pub use normalize::Normalized;
pub use person::PersonKey;
pub use record::PetitionRecord;
