//! Pending profile staging entities.

pub mod model;

pub use model::{PendingProfile, RoleDetails};
