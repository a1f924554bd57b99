//! NGO extension entities.

pub mod kind;
pub mod model;

pub use kind::NgoType;
pub use model::{NgoProfile, UpsertNgoProfile};
