//! # ecolearn-auth
//!
//! Passwordless sign-in with deferred profile provisioning.
//!
//! ## Modules
//!
//! - `backend`: the auth backend seam (hosted GoTrue-compatible HTTP service or in-process)
//! - `issuer`: magic-link issuance tagged with the requested role
//! - `form`: sign-in form fields and their validation
//! - `pending`: the single-slot pending profile cache
//! - `profile`: profile store seam and the provisioner that drains the pending cache
//! - `router`: role-based post-sign-in navigation
//! - `session`: the identity session manager and its published state

pub mod backend;
pub mod error;
pub mod form;
pub mod issuer;
pub mod pending;
pub mod profile;
pub mod router;
pub mod session;

pub use backend::{AuthBackend, AuthEvent, HttpAuthBackend, MemoryAuthBackend};
pub use error::{BackendError, CredentialError, ProvisioningError};
pub use form::SignInForm;
pub use issuer::{CredentialIssuer, SignInRole};
pub use pending::PendingProfileCache;
pub use profile::{
    MemoryProfileStore, PgProfileStore, ProfileProvisioner, ProfileStore, ProvisionOutcome,
};
pub use router::{Navigator, RecordingNavigator, RoleRouter};
pub use session::{AuthState, IdentitySession, ProfileState, SessionStorage};
