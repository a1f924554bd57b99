//! Verification state shared by teacher and NGO extensions.

pub mod status;

pub use status::VerificationStatus;
