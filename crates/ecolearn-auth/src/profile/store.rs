//! Profile store trait.

use async_trait::async_trait;
use ecolearn_core::result::AppResult;
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::ngo::{NgoProfile, UpsertNgoProfile};
use ecolearn_entity::profile::{NewProfile, Profile, Role, RoleExtension};
use ecolearn_entity::teacher::{TeacherProfile, UpsertTeacherProfile};

/// Storage for base profiles and role extension records.
///
/// Implementations must keep one base profile per principal with an
/// immutable role, and at most one extension record per principal.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a base profile.
    async fn find_profile(&self, id: PrincipalId) -> AppResult<Option<Profile>>;

    /// Insert a base profile unless one exists; returns the stored row,
    /// whose role may differ from `profile.role`.
    async fn create_profile_if_absent(&self, profile: &NewProfile) -> AppResult<Profile>;

    /// Insert or update the teacher extension for a principal.
    async fn upsert_teacher_profile(
        &self,
        data: &UpsertTeacherProfile,
    ) -> AppResult<TeacherProfile>;

    /// Insert or update the NGO extension for a principal.
    async fn upsert_ngo_profile(&self, data: &UpsertNgoProfile) -> AppResult<NgoProfile>;

    /// Fetch the extension record matching `role`.
    async fn find_extension(
        &self,
        id: PrincipalId,
        role: Role,
    ) -> AppResult<Option<RoleExtension>>;
}
