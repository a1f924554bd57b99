//! Teacher extension entities.

pub mod institution;
pub mod model;

pub use institution::{InstitutionChoice, KNOWN_INSTITUTIONS, OTHER_INSTITUTION};
pub use model::{TeacherProfile, UpsertTeacherProfile};
