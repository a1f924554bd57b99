//! # ecolearn-entity
//!
//! Domain entity models for EcoLearn identity. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod ngo;
pub mod pending;
pub mod principal;
pub mod profile;
pub mod teacher;
pub mod verification;
