//! Integration tests for deferred provisioning and its degraded paths.

mod helpers;

use std::sync::Arc;

use ecolearn_auth::backend::LinkCallback;
use ecolearn_auth::{
    AuthBackend, MemoryAuthBackend, MemoryProfileStore, ProfileStore, SessionStorage,
};
use ecolearn_cache::LocalStoreManager;
use ecolearn_cache::file::FileLocalStore;
use ecolearn_core::config::AppConfig;
use ecolearn_entity::profile::{Role, RoleExtension};

use helpers::{TestApp, lakeside_form, ngo_form, unthrottled_config};

#[tokio::test]
async fn test_profile_read_failure_leaves_profile_incomplete() {
    let app = TestApp::new().await;
    app.session.sign_in_with_magic_link(&lakeside_form()).await.unwrap();
    app.profiles.set_fail_reads(true);

    let state = app.confirm_latest_link("alice@school.edu").await;
    assert!(state.is_authenticated());
    assert_eq!(state.name(), "profile_incomplete");
    assert!(app.navigator.history().is_empty());

    // Provisioning only writes, so the extension is still in place.
    let principal = state.principal().unwrap();
    assert_eq!(app.profiles.extension_count(principal.id).await, 1);
    app.shutdown().await;
}

#[tokio::test]
async fn test_provisioning_failure_does_not_block_sign_in() {
    let app = TestApp::new().await;
    app.session
        .sign_in_with_magic_link(&ngo_form("info@river.org", "River Keepers"))
        .await
        .unwrap();
    app.profiles.set_fail_writes(true);

    let state = app.confirm_latest_link("info@river.org").await;
    assert!(state.is_authenticated());
    assert_eq!(state.name(), "profile_incomplete");
    assert_eq!(app.profiles.profile_count().await, 0);
    assert!(app.pending().peek().await.unwrap().is_none());
    app.shutdown().await;
}

#[tokio::test]
async fn test_existing_role_is_never_overwritten() {
    let app = TestApp::with_config(unthrottled_config(), "/auth").await;

    app.session
        .sign_in_with_magic_link(&ngo_form("alice@school.edu", "River Keepers"))
        .await
        .unwrap();
    let state = app.confirm_latest_link("alice@school.edu").await;
    let principal = state.principal().unwrap().clone();
    app.session.sign_out().await.unwrap();

    app.navigator.visit("/auth");
    app.session.sign_in_with_magic_link(&lakeside_form()).await.unwrap();
    let state = app.confirm_latest_link("alice@school.edu").await;

    assert_eq!(state.profile().map(|p| p.role), Some(Role::Ngo));
    assert!(
        app.profiles
            .find_extension(principal.id, Role::Teacher)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(app.profiles.extension_count(principal.id).await, 1);
    assert_eq!(app.navigator.history(), vec!["/ngo-dashboard", "/ngo-dashboard"]);
    app.shutdown().await;
}

#[tokio::test]
async fn test_no_redirect_outside_allow_list() {
    let app = TestApp::with_config(AppConfig::default(), "/lessons/7").await;
    app.session.sign_in_with_magic_link(&lakeside_form()).await.unwrap();

    let state = app.confirm_latest_link("alice@school.edu").await;
    assert_eq!(state.name(), "authenticated");
    assert!(app.navigator.history().is_empty());
    app.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_observations_provision_once() {
    let app = TestApp::new().await;
    app.session.sign_in_with_magic_link(&lakeside_form()).await.unwrap();

    let link = app.backend.latest_link("alice@school.edu").await.unwrap();
    let callback = LinkCallback::parse(&link.url).unwrap();
    let principal = app.backend.exchange_callback(&callback).await.unwrap();

    let (a, b) = tokio::join!(
        app.session.observe_session(Some(principal.clone())),
        app.session.observe_session(Some(principal.clone())),
    );
    assert_eq!(a.name(), "authenticated");
    assert_eq!(b.name(), "authenticated");
    assert_eq!(app.profiles.profile_count().await, 1);
    assert_eq!(app.profiles.extension_count(principal.id).await, 1);
    assert_eq!(app.navigator.history(), vec!["/teacher-dashboard"]);
    app.shutdown().await;
}

#[tokio::test]
async fn test_staged_fields_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_store.json");
    let file_store = || {
        Arc::new(LocalStoreManager::from_provider(Arc::new(FileLocalStore::at(
            &path,
        ))))
    };

    let config = AppConfig::default();
    let profiles = MemoryProfileStore::new();
    let backend = MemoryAuthBackend::new(&config.auth, SessionStorage::new(file_store()));

    let before = TestApp::assemble(
        config.clone(),
        file_store(),
        backend.clone(),
        profiles.clone(),
        "/auth",
    )
    .await;
    before.session.sign_in_with_magic_link(&lakeside_form()).await.unwrap();
    before.shutdown().await;
    drop(before);

    let after = TestApp::assemble(config, file_store(), backend, profiles, "/auth").await;
    let state = after.confirm_latest_link("alice@school.edu").await;
    let principal = state.principal().unwrap();

    match after
        .profiles
        .find_extension(principal.id, Role::Teacher)
        .await
        .unwrap()
    {
        Some(RoleExtension::Teacher(teacher)) => {
            assert_eq!(teacher.institution, "Lakeside Academy")
        }
        other => panic!("unexpected {other:?}"),
    }
    after.shutdown().await;
}
