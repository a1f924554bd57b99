//! Pending profile staging.

pub mod cache;

pub use cache::PendingProfileCache;
