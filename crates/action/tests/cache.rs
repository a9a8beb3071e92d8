//! Browser cache decisions against a scripted backend

mod common;

use std::path::PathBuf;

use common::{CountingInventory, FakeBackend, WarningCollector, LOCAL_CONFIG, REMOTE_CONFIG};
use tempfile::TempDir;
use tracing::Level;

use testplane_ci::testplane::cache::{cache_backend, cache_primary_key, cache_restore_key};
use testplane_ci::testplane::{CacheDecision, RestoreOutcome, TestplaneCache};
use testplane_ci_common::workflow::Platform;
use testplane_ci_common::{CacheBackend, DirectoryCache};

const BROWSERS: &str = "chrome@130 firefox@130";

fn platform() -> Platform {
    Platform::from_rust("linux", "x86_64")
}

fn cache_for<'a>(inventory: &'a CountingInventory, backend: FakeBackend) -> TestplaneCache<'a, CountingInventory, FakeBackend> {
    TestplaneCache::new(inventory, backend)
        .with_platform(platform())
        .with_cache_path("/home/runner/.testplane")
}

fn primary_key() -> String {
    cache_primary_key(&platform(), BROWSERS)
}

#[tokio::test]
async fn test_remote_grid_skips_cache() {
    let inventory = CountingInventory::new(REMOTE_CONFIG, BROWSERS);
    let backend = FakeBackend::available();
    let mut cache = cache_for(&inventory, backend.clone());

    assert!(!cache.restore_cache().await.unwrap());
    cache.save_cache().await.unwrap();

    assert_eq!(cache.decision(), &CacheDecision::NotApplicable);
    assert_eq!(backend.restore_calls(), 0);
    assert!(backend.save_calls().is_empty());
    assert_eq!(inventory.list_calls(), 0);
}

#[tokio::test]
async fn test_unavailable_backend_skips_cache() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let backend = FakeBackend::unavailable();
    let mut cache = cache_for(&inventory, backend.clone());

    assert_eq!(cache.restore().await.unwrap(), RestoreOutcome::Skipped);
    cache.save_cache().await.unwrap();

    assert_eq!(cache.decision(), &CacheDecision::NotApplicable);
    assert_eq!(backend.restore_calls(), 0);
    assert!(backend.save_calls().is_empty());
}

#[tokio::test]
async fn test_init_runs_once() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let mut cache = cache_for(&inventory, FakeBackend::available());

    assert_eq!(cache.decision(), &CacheDecision::Unknown);

    cache.restore_cache().await.unwrap();
    cache.restore_cache().await.unwrap();
    cache.save_cache().await.unwrap();

    assert_eq!(inventory.config_calls(), 1);
    assert_eq!(inventory.list_calls(), 1);
    assert_eq!(
        cache.decision(),
        &CacheDecision::Applicable {
            primary_key: primary_key(),
            restore_key: "linux-x64-testplane_browsers-".to_string(),
        }
    );
}

#[tokio::test]
async fn test_restore_requests_cache_path_with_both_keys() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let backend = FakeBackend::available();
    let mut cache = cache_for(&inventory, backend.clone());

    cache.restore_cache().await.unwrap();

    let (paths, primary, restore_keys) = backend.last_restore().unwrap();
    assert_eq!(paths, [PathBuf::from("/home/runner/.testplane")]);
    assert_eq!(primary, primary_key());
    assert_eq!(restore_keys, [cache_restore_key(&platform())]);
}

#[tokio::test]
async fn test_exact_hit_skips_save() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let backend = FakeBackend::available().restoring(&primary_key());
    let mut cache = cache_for(&inventory, backend.clone());

    assert!(cache.restore_cache().await.unwrap());
    assert_eq!(cache.restored_key(), Some(primary_key().as_str()));

    cache.save_cache().await.unwrap();

    assert!(backend.save_calls().is_empty());
}

#[tokio::test]
async fn test_fallback_hit_saves_once() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let older = format!("{}{}", cache_restore_key(&platform()), "0".repeat(64));
    let backend = FakeBackend::available().restoring(&older);
    let mut cache = cache_for(&inventory, backend.clone());

    assert_eq!(cache.restore().await.unwrap(), RestoreOutcome::FallbackHit(older));

    cache.save_cache().await.unwrap();

    assert_eq!(
        backend.save_calls(),
        vec![(vec![PathBuf::from("/home/runner/.testplane")], primary_key())]
    );
}

#[tokio::test]
async fn test_miss_saves_once() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let backend = FakeBackend::available();
    let mut cache = cache_for(&inventory, backend.clone());

    assert_eq!(cache.restore().await.unwrap(), RestoreOutcome::Miss);
    assert!(!cache.restore_cache().await.unwrap());

    cache.save_cache().await.unwrap();

    assert_eq!(backend.save_calls().len(), 1);
}

#[tokio::test]
async fn test_save_without_restore_still_saves() {
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let backend = FakeBackend::available();
    let mut cache = cache_for(&inventory, backend.clone());

    cache.save_cache().await.unwrap();

    assert_eq!(backend.restore_calls(), 0);
    assert_eq!(backend.save_calls().len(), 1);
}

#[tokio::test]
async fn test_backend_errors_only_warn() {
    let warnings = WarningCollector::default();
    let _guard = warnings.install();
    let inventory = CountingInventory::new(LOCAL_CONFIG, BROWSERS);
    let backend = FakeBackend::available().failing();
    let mut cache = cache_for(&inventory, backend.clone());

    assert_eq!(cache.restore().await.unwrap(), RestoreOutcome::Miss);
    cache.save_cache().await.unwrap();

    assert_eq!(backend.save_calls().len(), 1);

    let messages = warnings.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("Failed to restore Testplane browsers cache"));
    assert!(messages[1].starts_with("Failed to save Testplane browsers cache"));
}

#[tokio::test]
async fn test_key_changes_with_browser_set() {
    let first = CountingInventory::new(LOCAL_CONFIG, "chrome@130");
    let second = CountingInventory::new(LOCAL_CONFIG, "chrome@130 firefox@130");
    let backend = FakeBackend::available();

    let mut first_cache = cache_for(&first, backend.clone());
    let mut second_cache = cache_for(&second, backend.clone());
    first_cache.init().await.unwrap();
    second_cache.init().await.unwrap();

    assert_ne!(first_cache.decision(), second_cache.decision());
}

#[test]
fn test_missing_cache_dir_disables_caching_with_notice() {
    let infos = WarningCollector::at_level(Level::INFO);
    let _guard = infos.install();

    let backend = cache_backend(None);

    assert!(!backend.is_available());
    assert_eq!(
        infos.messages(),
        ["Browser caching is disabled: TESTPLANE_CI_CACHE_DIR is not set"]
    );
}

#[test]
fn test_configured_cache_dir_is_used() {
    let infos = WarningCollector::at_level(Level::INFO);
    let _guard = infos.install();
    let dir = TempDir::new().unwrap();

    let backend = cache_backend(Some(DirectoryCache::new(dir.path().join("cache"))));

    assert!(backend.is_available());
    assert!(infos.messages().is_empty());
}
