//! Base profile domain entities.

pub mod extension;
pub mod model;
pub mod role;

pub use extension::RoleExtension;
pub use model::{NewProfile, Profile};
pub use role::Role;
