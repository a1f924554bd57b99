//! Core traits defined in `ecolearn-core` and implemented by other crates.

pub mod local_store;

pub use local_store::LocalStore;
