//! Installed application records as reported by the device catalog.

use serde::{Deserialize, Serialize};

use crate::AppId;

/// An application installed on the device.
///
/// Serialized with the field names the native catalog emits
/// (`appName`, `packageName`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstalledApp {
    /// Human-readable label.
    #[serde(rename = "appName")]
    pub name: String,
    /// Stable identifier.
    #[serde(rename = "packageName")]
    pub id: AppId,
}

impl InstalledApp {
    /// Creates a new installed-app record.
    pub fn new(name: impl Into<String>, id: impl Into<AppId>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// Case-insensitive substring match against the display name.
    #[must_use]
    pub fn name_matches(&self, lowercase_term: &str) -> bool {
        self.name.to_lowercase().contains(lowercase_term)
    }
}
