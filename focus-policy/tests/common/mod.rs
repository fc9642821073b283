//! Shared fixtures for policy tests.

#![allow(dead_code)]

use async_trait::async_trait;
use focus_policy::{
    AppCatalog, CatalogError, CatalogResult, NavigationContext, PolicyConfig, PolicyStore,
    StaticCatalog,
};
use focus_storage::{MemoryPrefsStore, PrefsStore, StorageError, StorageResult};
use focus_types::{AppId, InstalledApp};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DIALER: &str = "com.android.dialer";

pub fn id(s: &str) -> AppId {
    AppId::new(s)
}

pub fn ids(list: &[&str]) -> Vec<AppId> {
    list.iter().copied().map(AppId::new).collect()
}

/// `count` ordinary apps named `App 00`, `App 01`, ... plus the dialer.
pub fn sample_apps(count: usize) -> Vec<InstalledApp> {
    let mut apps: Vec<InstalledApp> = (0..count)
        .map(|i| InstalledApp::new(format!("App {i:02}"), format!("com.app.{i:02}")))
        .collect();
    apps.push(InstalledApp::new("Phone", DIALER));
    apps
}

pub fn app_id(i: usize) -> AppId {
    AppId::new(format!("com.app.{i:02}"))
}

pub fn test_config() -> PolicyConfig {
    PolicyConfig::default().with_essential_apps([DIALER])
}

/// Store over a fresh memory backend, with every key loaded.
pub async fn loaded_store(apps: Vec<InstalledApp>) -> (PolicyStore, MemoryPrefsStore) {
    let prefs = MemoryPrefsStore::new();
    let store = store_over(prefs.clone(), apps).await;
    (store, prefs)
}

/// Store over an existing memory backend, with every key loaded.
pub async fn store_over(prefs: MemoryPrefsStore, apps: Vec<InstalledApp>) -> PolicyStore {
    let store = PolicyStore::new(
        Arc::new(prefs),
        Arc::new(StaticCatalog::new(apps)),
        test_config(),
    );
    store.load_all().await;
    store
}

pub fn persisted_ids(prefs: &MemoryPrefsStore, key: &str) -> Vec<AppId> {
    prefs
        .raw(key)
        .map(|raw| serde_json::from_str(&raw).unwrap())
        .unwrap_or_default()
}

/// Prefs store whose writes always fail; reads delegate to memory.
#[derive(Debug, Default)]
pub struct FailingPrefsStore {
    pub inner: MemoryPrefsStore,
    pub failed_writes: AtomicUsize,
}

#[async_trait]
impl PrefsStore for FailingPrefsStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        self.failed_writes.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Backend("disk full".to_string()))
    }

    async fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Backend("disk full".to_string()))
    }
}

/// Catalog that always fails.
#[derive(Debug, Default)]
pub struct FailingCatalog;

#[async_trait]
impl AppCatalog for FailingCatalog {
    async fn list_installed_apps(&self) -> CatalogResult<Vec<InstalledApp>> {
        Err(CatalogError::Unavailable("bridge not ready".to_string()))
    }
}

/// Navigation context that records redirects.
#[derive(Debug, Default)]
pub struct RecordingNavigation {
    pub detail: Mutex<Option<AppId>>,
    pub redirects: AtomicUsize,
}

impl RecordingNavigation {
    pub fn showing(id: &AppId) -> Self {
        Self {
            detail: Mutex::new(Some(id.clone())),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl NavigationContext for RecordingNavigation {
    fn current_detail(&self) -> Option<AppId> {
        self.detail.lock().unwrap().clone()
    }

    fn redirect_home(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.detail.lock().unwrap() = None;
    }
}
