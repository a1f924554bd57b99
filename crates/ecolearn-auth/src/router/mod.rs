//! Post-sign-in navigation.

pub mod navigator;
pub mod role_router;

pub use navigator::{Navigator, RecordingNavigator};
pub use role_router::RoleRouter;
