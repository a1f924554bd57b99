//! Durable JSON-file local store.

pub mod store;

pub use store::FileLocalStore;
