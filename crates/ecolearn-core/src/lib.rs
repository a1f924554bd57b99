//! # ecolearn-core
//!
//! Core crate for EcoLearn. Contains configuration schemas, typed
//! identifiers, the client-local storage trait, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other EcoLearn crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
