//! In-memory profile store using a Tokio mutex.
//!
//! Mirrors the PostgreSQL semantics: insert-if-absent base profiles,
//! extension upserts that keep verification state, and a conflict when
//! an extension is written before its base profile. Reads and writes can
//! be made to fail for exercising degraded paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use ecolearn_core::error::AppError;
use ecolearn_core::result::AppResult;
use ecolearn_core::types::PrincipalId;
use ecolearn_entity::ngo::{NgoProfile, UpsertNgoProfile};
use ecolearn_entity::profile::{NewProfile, Profile, Role, RoleExtension};
use ecolearn_entity::teacher::{TeacherProfile, UpsertTeacherProfile};
use ecolearn_entity::verification::VerificationStatus;
use tokio::sync::Mutex;

use super::store::ProfileStore;

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<PrincipalId, Profile>,
    teachers: HashMap<PrincipalId, TeacherProfile>,
    ngos: HashMap<PrincipalId, NgoProfile>,
}

/// In-memory [`ProfileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    tables: Arc<Mutex<Tables>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with a database error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with a database error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of base profiles.
    pub async fn profile_count(&self) -> usize {
        self.tables.lock().await.profiles.len()
    }

    /// Number of extension records (of any role) for a principal.
    pub async fn extension_count(&self, id: PrincipalId) -> usize {
        let tables = self.tables.lock().await;
        usize::from(tables.teachers.contains_key(&id)) + usize::from(tables.ngos.contains_key(&id))
    }

    fn check_read(&self) -> AppResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::database("profile store unavailable"));
        }
        Ok(())
    }

    fn check_write(&self) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("profile store rejected the write"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find_profile(&self, id: PrincipalId) -> AppResult<Option<Profile>> {
        self.check_read()?;
        Ok(self.tables.lock().await.profiles.get(&id).cloned())
    }

    async fn create_profile_if_absent(&self, profile: &NewProfile) -> AppResult<Profile> {
        self.check_write()?;
        let now = Utc::now();
        let mut tables = self.tables.lock().await;
        let stored = tables.profiles.entry(profile.id).or_insert_with(|| Profile {
            id: profile.id,
            display_name: profile.display_name.clone(),
            role: profile.role,
            created_at: now,
            updated_at: now,
        });
        Ok(stored.clone())
    }

    async fn upsert_teacher_profile(
        &self,
        data: &UpsertTeacherProfile,
    ) -> AppResult<TeacherProfile> {
        self.check_write()?;
        let now = Utc::now();
        let mut tables = self.tables.lock().await;
        if !tables.profiles.contains_key(&data.id) {
            return Err(AppError::conflict(format!(
                "No base profile exists for {}",
                data.id
            )));
        }

        let row = tables
            .teachers
            .entry(data.id)
            .and_modify(|row| {
                row.institution = data.institution.clone();
                row.school_email = data.school_email.clone();
                row.updated_at = now;
            })
            .or_insert_with(|| TeacherProfile {
                id: data.id,
                institution: data.institution.clone(),
                school_email: data.school_email.clone(),
                verification_status: VerificationStatus::Pending,
                verification_document: None,
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn upsert_ngo_profile(&self, data: &UpsertNgoProfile) -> AppResult<NgoProfile> {
        self.check_write()?;
        let now = Utc::now();
        let mut tables = self.tables.lock().await;
        if !tables.profiles.contains_key(&data.id) {
            return Err(AppError::conflict(format!(
                "No base profile exists for {}",
                data.id
            )));
        }

        let row = tables
            .ngos
            .entry(data.id)
            .and_modify(|row| {
                row.organization_name = data.organization_name.clone();
                row.ngo_type = data.ngo_type;
                row.official_email = data.official_email.clone();
                row.website_url = data.website_url.clone();
                row.updated_at = now;
            })
            .or_insert_with(|| NgoProfile {
                id: data.id,
                organization_name: data.organization_name.clone(),
                ngo_type: data.ngo_type,
                official_email: data.official_email.clone(),
                website_url: data.website_url.clone(),
                verification_status: VerificationStatus::Pending,
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn find_extension(
        &self,
        id: PrincipalId,
        role: Role,
    ) -> AppResult<Option<RoleExtension>> {
        self.check_read()?;
        let tables = self.tables.lock().await;
        Ok(match role {
            Role::Teacher => tables.teachers.get(&id).cloned().map(RoleExtension::Teacher),
            Role::Ngo => tables.ngos.get(&id).cloned().map(RoleExtension::Ngo),
            Role::Student => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use ecolearn_core::error::ErrorKind;

    use super::*;

    fn new_profile(id: PrincipalId, role: Role) -> NewProfile {
        NewProfile {
            id,
            display_name: "alice".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_if_absent_keeps_first_role() {
        let store = MemoryProfileStore::new();
        let id = PrincipalId::new();

        let first = store.create_profile_if_absent(&new_profile(id, Role::Teacher)).await.unwrap();
        let second = store.create_profile_if_absent(&new_profile(id, Role::Ngo)).await.unwrap();

        assert_eq!(first.role, Role::Teacher);
        assert_eq!(second.role, Role::Teacher);
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn test_extension_requires_base_profile() {
        let store = MemoryProfileStore::new();
        let err = store
            .upsert_teacher_profile(&UpsertTeacherProfile {
                id: PrincipalId::new(),
                institution: "Lakeside Academy".to_string(),
                school_email: "a@lakeside.edu".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_upsert_preserves_verification() {
        let store = MemoryProfileStore::new();
        let id = PrincipalId::new();
        store.create_profile_if_absent(&new_profile(id, Role::Teacher)).await.unwrap();

        let data = UpsertTeacherProfile {
            id,
            institution: "Lakeside Academy".to_string(),
            school_email: "a@lakeside.edu".to_string(),
        };
        store.upsert_teacher_profile(&data).await.unwrap();
        store.tables.lock().await.teachers.get_mut(&id).unwrap().verification_status =
            VerificationStatus::Verified;

        let updated = store
            .upsert_teacher_profile(&UpsertTeacherProfile {
                institution: "Hillside School".to_string(),
                ..data
            })
            .await
            .unwrap();
        assert_eq!(updated.institution, "Hillside School");
        assert_eq!(updated.verification_status, VerificationStatus::Verified);
        assert_eq!(store.extension_count(id).await, 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryProfileStore::new();
        store.set_fail_reads(true);
        assert!(store.find_profile(PrincipalId::new()).await.is_err());

        store.set_fail_reads(false);
        store.set_fail_writes(true);
        let err = store
            .create_profile_if_absent(&new_profile(PrincipalId::new(), Role::Ngo))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
    }
}
