//! Device app catalog seam.

use async_trait::async_trait;
use focus_types::InstalledApp;
use std::sync::RwLock;

use crate::error::{CatalogError, CatalogResult};

/// Source of the installed-application list.
#[async_trait]
pub trait AppCatalog: Send + Sync {
    /// Returns false on platforms without a native catalog; the store then
    /// skips loading entirely.
    fn is_supported(&self) -> bool {
        true
    }

    /// Lists the currently installed applications.
    async fn list_installed_apps(&self) -> CatalogResult<Vec<InstalledApp>>;
}

/// Catalog for platforms that cannot enumerate apps.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCatalog;

#[async_trait]
impl AppCatalog for UnsupportedCatalog {
    fn is_supported(&self) -> bool {
        false
    }

    async fn list_installed_apps(&self) -> CatalogResult<Vec<InstalledApp>> {
        Err(CatalogError::Unsupported)
    }
}

/// Catalog serving a fixed list that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    apps: RwLock<Vec<InstalledApp>>,
}

impl StaticCatalog {
    /// Creates a catalog serving `apps`.
    pub fn new(apps: Vec<InstalledApp>) -> Self {
        Self {
            apps: RwLock::new(apps),
        }
    }

    /// Replaces the served list (simulates installs and uninstalls).
    pub fn set_apps(&self, apps: Vec<InstalledApp>) {
        if let Ok(mut guard) = self.apps.write() {
            *guard = apps;
        }
    }
}

#[async_trait]
impl AppCatalog for StaticCatalog {
    async fn list_installed_apps(&self) -> CatalogResult<Vec<InstalledApp>> {
        self.apps
            .read()
            .map(|apps| apps.clone())
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))
    }
}
