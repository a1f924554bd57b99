//! Magic-link issuance.

pub mod magic_link;
pub mod role;

pub use magic_link::{CredentialIssuer, normalize_email};
pub use role::SignInRole;
