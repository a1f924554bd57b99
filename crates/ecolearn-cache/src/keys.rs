//! Local store key builders.
//!
//! Centralising key construction keeps every key the application writes
//! in one place.

/// Prefix applied to all EcoLearn local store keys.
const PREFIX: &str = "ecolearn";

/// Single slot holding the pending profile entry.
pub fn pending_profile() -> String {
    format!("{PREFIX}:pending_profile")
}

/// Persisted auth session (principal and tokens).
pub fn auth_session() -> String {
    format!("{PREFIX}:auth:session")
}
