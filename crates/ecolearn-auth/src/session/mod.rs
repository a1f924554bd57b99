//! Identity session: current principal, its profile, and the
//! sign-in/sign-out operations.

pub mod manager;
pub mod state;
pub mod storage;

pub use manager::IdentitySession;
pub use state::{AuthState, ProfileState};
pub use storage::SessionStorage;
