//! Authenticated principal entities.

pub mod model;

pub use model::{Principal, PrincipalMetadata, display_name_from_email};
