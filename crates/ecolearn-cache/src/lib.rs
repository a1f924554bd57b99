//! # ecolearn-cache
//!
//! Client-local store providers for EcoLearn. Two modes:
//!
//! - **file**: a single JSON document on disk, surviving process restarts
//! - **memory**: in-process store using [moka](https://crates.io/crates/moka)
//!
//! The provider is selected at runtime based on configuration.

pub mod file;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::LocalStoreManager;
