//! # ecolearn-database
//!
//! PostgreSQL connection management and repositories for the base
//! profile and role extension tables.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
