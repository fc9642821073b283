//! Policy engine configuration.

use focus_types::{AppId, HexColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{PolicyError, PolicyResult};

/// Smallest selection limit a user can configure.
pub const MIN_SELECTION_LIMIT: usize = 1;
/// Largest selection limit a user can configure.
pub const MAX_SELECTION_LIMIT: usize = 50;
/// Selection limit used when nothing valid is persisted.
pub const DEFAULT_SELECTION_LIMIT: usize = 7;
/// Period of the override expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5_000;

/// Identifiers of dialer, messaging and camera apps on stock Android builds.
const DEFAULT_ESSENTIAL_APPS: &[&str] = &[
    "com.android.dialer",
    "com.google.android.dialer",
    "com.samsung.android.dialer",
    "com.android.mms",
    "com.android.messaging",
    "com.google.android.apps.messaging",
    "com.samsung.android.messaging",
    "com.android.camera",
    "com.android.camera2",
    "com.google.android.GoogleCamera",
    "com.sec.android.app.camera",
];

/// Clamps a requested selection limit into
/// `[MIN_SELECTION_LIMIT, MAX_SELECTION_LIMIT]`.
#[must_use]
pub fn clamp_selection_limit(requested: i64) -> usize {
    requested.clamp(MIN_SELECTION_LIMIT as i64, MAX_SELECTION_LIMIT as i64) as usize
}

/// Configuration for the policy store and its sweeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Apps that stay reachable regardless of selection or restriction.
    pub essential_apps: BTreeSet<AppId>,
    /// Selection limit used when none is persisted.
    pub default_selection_limit: usize,
    /// Background used when none is persisted.
    pub default_background_color: HexColor,
    /// Sweep period in milliseconds.
    pub sweep_interval_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            essential_apps: DEFAULT_ESSENTIAL_APPS.iter().copied().map(AppId::from).collect(),
            default_selection_limit: DEFAULT_SELECTION_LIMIT,
            default_background_color: HexColor::black(),
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl PolicyConfig {
    /// Parses a TOML document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed TOML or values that fail [`validate`](Self::validate).
    pub fn from_toml_str(raw: &str) -> PolicyResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces the essential allow-list.
    #[must_use]
    pub fn with_essential_apps<I, T>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<AppId>,
    {
        self.essential_apps = apps.into_iter().map(Into::into).collect();
        self
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> PolicyResult<()> {
        if !(MIN_SELECTION_LIMIT..=MAX_SELECTION_LIMIT).contains(&self.default_selection_limit) {
            return Err(PolicyError::InvalidConfig(format!(
                "default_selection_limit must be within {}..={}, got {}",
                MIN_SELECTION_LIMIT, MAX_SELECTION_LIMIT, self.default_selection_limit
            )));
        }
        if self.sweep_interval_ms == 0 {
            return Err(PolicyError::InvalidConfig(
                "sweep_interval_ms must be positive".to_string(),
            ));
        }
        if let Some(blank) = self.essential_apps.iter().find(|id| id.as_str().trim().is_empty()) {
            return Err(PolicyError::InvalidConfig(format!(
                "essential_apps contains a blank identifier: {blank:?}"
            )));
        }
        Ok(())
    }

    /// Default limit, clamped in case the config was built by hand.
    #[must_use]
    pub fn default_limit(&self) -> usize {
        clamp_selection_limit(self.default_selection_limit as i64)
    }

    /// Sweep period.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }

    /// Returns true if `id` is on the essential allow-list.
    #[must_use]
    pub fn is_essential(&self, id: &AppId) -> bool {
        self.essential_apps.contains(id)
    }
}
