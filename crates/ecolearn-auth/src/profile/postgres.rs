//! PostgreSQL-backed profile store.

use async_trait::async_trait;
use ecolearn_core::result::AppResult;
use ecolearn_core::types::PrincipalId;
use ecolearn_database::DatabasePool;
use ecolearn_database::repositories::{
    NgoProfileRepository, ProfileRepository, TeacherProfileRepository,
};
use ecolearn_entity::ngo::{NgoProfile, UpsertNgoProfile};
use ecolearn_entity::profile::{NewProfile, Profile, Role, RoleExtension};
use ecolearn_entity::teacher::{TeacherProfile, UpsertTeacherProfile};

use super::store::ProfileStore;

/// [`ProfileStore`] over the sqlx repositories.
#[derive(Debug, Clone)]
pub struct PgProfileStore {
    profiles: ProfileRepository,
    teachers: TeacherProfileRepository,
    ngos: NgoProfileRepository,
}

impl PgProfileStore {
    /// Create a store sharing the given pool.
    pub fn new(db: &DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            profiles: ProfileRepository::new(pool.clone()),
            teachers: TeacherProfileRepository::new(pool.clone()),
            ngos: NgoProfileRepository::new(pool),
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_profile(&self, id: PrincipalId) -> AppResult<Option<Profile>> {
        self.profiles.find_by_id(id).await
    }

    async fn create_profile_if_absent(&self, profile: &NewProfile) -> AppResult<Profile> {
        self.profiles.create_if_absent(profile).await
    }

    async fn upsert_teacher_profile(
        &self,
        data: &UpsertTeacherProfile,
    ) -> AppResult<TeacherProfile> {
        self.teachers.upsert(data).await
    }

    async fn upsert_ngo_profile(&self, data: &UpsertNgoProfile) -> AppResult<NgoProfile> {
        self.ngos.upsert(data).await
    }

    async fn find_extension(
        &self,
        id: PrincipalId,
        role: Role,
    ) -> AppResult<Option<RoleExtension>> {
        match role {
            Role::Teacher => Ok(self.teachers.find_by_id(id).await?.map(RoleExtension::Teacher)),
            Role::Ngo => Ok(self.ngos.find_by_id(id).await?.map(RoleExtension::Ngo)),
            Role::Student => Ok(None),
        }
    }
}
