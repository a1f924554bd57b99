//! Deferred profile provisioning.
//!
//! Runs every time the session manager observes a signed-in principal.
//! When the pending cache holds an entry, the base profile is created if
//! absent and the role extension is upserted from the staged fields.
//! Without an entry, a principal whose link carried a role still gets a
//! base profile so the role router has something to read.

use std::sync::Arc;

use ecolearn_entity::ngo::UpsertNgoProfile;
use ecolearn_entity::pending::{PendingProfile, RoleDetails};
use ecolearn_entity::principal::Principal;
use ecolearn_entity::profile::{NewProfile, Profile, RoleExtension};
use ecolearn_entity::teacher::UpsertTeacherProfile;
use tracing::{debug, info, warn};

use super::store::ProfileStore;
use crate::error::ProvisioningError;
use crate::pending::PendingProfileCache;

/// What a provisioning pass did.
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionOutcome {
    /// No staged entry and nothing to create.
    NothingPending,
    /// No staged entry; a base profile was created from link metadata.
    BaseProfileCreated(Profile),
    /// The staged entry was written.
    Provisioned {
        /// Base profile (new or existing).
        profile: Profile,
        /// The upserted extension record.
        extension: RoleExtension,
    },
}

/// Drains the pending cache into the profile store.
#[derive(Debug, Clone)]
pub struct ProfileProvisioner {
    pending: PendingProfileCache,
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileProvisioner {
    /// Create a provisioner.
    pub fn new(pending: PendingProfileCache, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { pending, profiles }
    }

    /// Provision the staged entry, if any, for `principal`.
    ///
    /// The entry is consumed before anything is written, so a failed
    /// write leaves the principal without an extension; nothing retries.
    pub async fn provision_if_pending(
        &self,
        principal: &Principal,
    ) -> Result<ProvisionOutcome, ProvisioningError> {
        let Some(entry) = self.pending.take_if_present().await? else {
            return self.ensure_base_profile(principal).await;
        };

        if !entry.email.eq_ignore_ascii_case(principal.email.trim()) {
            // The entry belongs to a link that has not been confirmed yet.
            self.pending.restore(&entry).await?;
            return Err(ProvisioningError::EmailMismatch {
                staged_for: entry.email,
                signed_in: principal.email.clone(),
            });
        }

        self.write_entry(principal, entry).await
    }

    async fn write_entry(
        &self,
        principal: &Principal,
        entry: PendingProfile,
    ) -> Result<ProvisionOutcome, ProvisioningError> {
        let role = entry.role();
        let profile = self
            .profiles
            .create_profile_if_absent(&NewProfile {
                id: principal.id,
                display_name: entry.display_name.clone(),
                role,
            })
            .await?;

        if profile.role != role {
            return Err(ProvisioningError::RoleMismatch {
                principal_id: principal.id,
                existing: profile.role,
                staged: role,
            });
        }

        let extension = match entry.details {
            RoleDetails::Teacher {
                institution,
                school_email,
            } => RoleExtension::Teacher(
                self.profiles
                    .upsert_teacher_profile(&UpsertTeacherProfile {
                        id: principal.id,
                        institution,
                        school_email,
                    })
                    .await?,
            ),
            RoleDetails::Ngo {
                organization_name,
                ngo_type,
                official_email,
                website_url,
            } => RoleExtension::Ngo(
                self.profiles
                    .upsert_ngo_profile(&UpsertNgoProfile {
                        id: principal.id,
                        organization_name,
                        ngo_type,
                        official_email,
                        website_url,
                    })
                    .await?,
            ),
        };

        info!(principal_id = %principal.id, role = %role, "Provisioned profile from pending entry");
        Ok(ProvisionOutcome::Provisioned { profile, extension })
    }

    async fn ensure_base_profile(
        &self,
        principal: &Principal,
    ) -> Result<ProvisionOutcome, ProvisioningError> {
        let Some(role) = principal.metadata.role else {
            debug!(principal_id = %principal.id, "Nothing pending");
            return Ok(ProvisionOutcome::NothingPending);
        };
        if self.profiles.find_profile(principal.id).await?.is_some() {
            debug!(principal_id = %principal.id, "Nothing pending");
            return Ok(ProvisionOutcome::NothingPending);
        }

        let profile = self
            .profiles
            .create_profile_if_absent(&NewProfile {
                id: principal.id,
                display_name: principal.fallback_display_name(),
                role,
            })
            .await?;
        warn!(
            principal_id = %principal.id,
            role = %profile.role,
            "No pending entry; created base profile without extension"
        );
        Ok(ProvisionOutcome::BaseProfileCreated(profile))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use ecolearn_cache::LocalStoreManager;
    use ecolearn_core::types::PrincipalId;
    use ecolearn_entity::ngo::NgoType;
    use ecolearn_entity::principal::PrincipalMetadata;
    use ecolearn_entity::profile::Role;
    use ecolearn_entity::verification::VerificationStatus;

    use super::*;
    use crate::profile::MemoryProfileStore;

    struct Fixture {
        provisioner: ProfileProvisioner,
        pending: PendingProfileCache,
        store: MemoryProfileStore,
    }

    fn fixture() -> Fixture {
        let pending = PendingProfileCache::new(Arc::new(LocalStoreManager::in_memory()));
        let store = MemoryProfileStore::new();
        Fixture {
            provisioner: ProfileProvisioner::new(pending.clone(), Arc::new(store.clone())),
            pending,
            store,
        }
    }

    fn principal(email: &str, role: Option<Role>) -> Principal {
        Principal {
            id: PrincipalId::new(),
            email: email.to_string(),
            access_token: "at".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::minutes(5),
            metadata: PrincipalMetadata {
                role,
                display_name: None,
            },
        }
    }

    fn teacher_entry(email: &str) -> PendingProfile {
        PendingProfile {
            email: email.to_string(),
            display_name: "alice".to_string(),
            details: RoleDetails::Teacher {
                institution: "Lakeside Academy".to_string(),
                school_email: "a@lakeside.edu".to_string(),
            },
            staged_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_nothing_pending_without_role_metadata() {
        let f = fixture();
        let outcome = f
            .provisioner
            .provision_if_pending(&principal("alice@school.edu", None))
            .await
            .unwrap();
        assert_eq!(outcome, ProvisionOutcome::NothingPending);
        assert_eq!(f.store.profile_count().await, 0);
    }

    #[tokio::test]
    async fn test_teacher_entry_is_provisioned() {
        let f = fixture();
        let alice = principal("alice@school.edu", Some(Role::Teacher));
        f.pending.stage(&teacher_entry("alice@school.edu")).await.unwrap();

        let outcome = f.provisioner.provision_if_pending(&alice).await.unwrap();
        let (profile, extension) = match outcome {
            ProvisionOutcome::Provisioned { profile, extension } => (profile, extension),
            other => panic!("expected provisioning, got {other:?}"),
        };
        assert_eq!(profile.role, Role::Teacher);
        let RoleExtension::Teacher(teacher) = extension else {
            panic!("expected teacher extension");
        };
        assert_eq!(teacher.institution, "Lakeside Academy");
        assert_eq!(teacher.verification_status, VerificationStatus::Pending);

        // Second observation of the same session finds nothing to do.
        let again = f.provisioner.provision_if_pending(&alice).await.unwrap();
        assert_eq!(again, ProvisionOutcome::NothingPending);
        assert_eq!(f.store.extension_count(alice.id).await, 1);
    }

    #[tokio::test]
    async fn test_role_mismatch_writes_no_extension() {
        let f = fixture();
        let alice = principal("alice@school.edu", Some(Role::Teacher));
        f.store
            .create_profile_if_absent(&NewProfile {
                id: alice.id,
                display_name: "alice".to_string(),
                role: Role::Student,
            })
            .await
            .unwrap();
        f.pending.stage(&teacher_entry("alice@school.edu")).await.unwrap();

        let err = f.provisioner.provision_if_pending(&alice).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisioningError::RoleMismatch {
                existing: Role::Student,
                staged: Role::Teacher,
                ..
            }
        ));
        assert_eq!(f.store.extension_count(alice.id).await, 0);
    }

    #[tokio::test]
    async fn test_entry_for_other_email_is_kept() {
        let f = fixture();
        f.pending.stage(&teacher_entry("alice@school.edu")).await.unwrap();

        let bob = principal("bob@school.edu", None);
        let err = f.provisioner.provision_if_pending(&bob).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::EmailMismatch { .. }));
        assert!(f.pending.peek().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_base_profile_from_link_metadata() {
        let f = fixture();
        let river = principal("info@river.org", Some(Role::Ngo));

        let outcome = f.provisioner.provision_if_pending(&river).await.unwrap();
        let profile = match outcome {
            ProvisionOutcome::BaseProfileCreated(profile) => profile,
            other => panic!("expected base profile, got {other:?}"),
        };
        assert_eq!(profile.role, Role::Ngo);
        assert_eq!(profile.display_name, "info");
        assert_eq!(f.store.extension_count(river.id).await, 0);
    }

    #[tokio::test]
    async fn test_write_failure_consumes_entry() {
        let f = fixture();
        let river = principal("info@river.org", Some(Role::Ngo));
        f.pending
            .stage(&PendingProfile {
                email: "info@river.org".to_string(),
                display_name: "River Keepers".to_string(),
                details: RoleDetails::Ngo {
                    organization_name: "River Keepers".to_string(),
                    ngo_type: NgoType::Environmental,
                    official_email: "info@river.org".to_string(),
                    website_url: None,
                },
                staged_at: Utc::now(),
            })
            .await
            .unwrap();
        f.store.set_fail_writes(true);

        assert!(matches!(
            f.provisioner.provision_if_pending(&river).await,
            Err(ProvisioningError::Store(_))
        ));
        assert!(f.pending.peek().await.unwrap().is_none());
    }
}
