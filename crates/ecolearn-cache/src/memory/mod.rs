//! In-memory local store.

pub mod store;

pub use store::MemoryLocalStore;
