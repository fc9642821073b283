//! Immutable policy snapshots and the derived app views.

use focus_types::{AppId, EpochMillis, HexColor, InstalledApp};
use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One consistent snapshot of policy state plus the views derived from it.
///
/// A new snapshot is built for every mutation, so the derived lists are always
/// computed from the same inputs that the snapshot reports.
#[derive(Debug, Clone, Default)]
pub struct PolicyView {
    revision: u64,
    installed: Arc<Vec<InstalledApp>>,
    selected: Vec<AppId>,
    restricted: Vec<AppId>,
    selection_limit: usize,
    background: HexColor,
    overrides: BTreeMap<AppId, EpochMillis>,
    available: Vec<InstalledApp>,
    visible: Vec<InstalledApp>,
}

impl PolicyView {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn compute(
        revision: u64,
        installed: Arc<Vec<InstalledApp>>,
        selected: &IndexSet<AppId>,
        restricted: &IndexSet<AppId>,
        essentials: &BTreeSet<AppId>,
        selection_limit: usize,
        background: HexColor,
        overrides: BTreeMap<AppId, EpochMillis>,
    ) -> Self {
        let available: Vec<InstalledApp> = installed
            .iter()
            .filter(|app| !restricted.contains(&app.id))
            .cloned()
            .collect();

        // available ∩ selected, plus every installed essential app
        let visible = installed
            .iter()
            .filter(|app| {
                let shown = selected.contains(&app.id) && !restricted.contains(&app.id);
                shown || essentials.contains(&app.id)
            })
            .cloned()
            .collect();

        Self {
            revision,
            installed,
            selected: selected.iter().cloned().collect(),
            restricted: restricted.iter().cloned().collect(),
            selection_limit,
            background,
            overrides,
            available,
            visible,
        }
    }

    /// Monotonic counter, bumped on every emission.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Installed apps in catalog order.
    pub fn installed_apps(&self) -> &[InstalledApp] {
        &self.installed
    }

    /// Selected identifiers in selection order.
    pub fn selected_apps(&self) -> &[AppId] {
        &self.selected
    }

    /// Restricted identifiers.
    pub fn restricted_apps(&self) -> &[AppId] {
        &self.restricted
    }

    /// Current selection limit.
    pub fn selection_limit(&self) -> usize {
        self.selection_limit
    }

    /// Current background color.
    pub fn background_color(&self) -> &HexColor {
        &self.background
    }

    /// Text color contrasting with the current background.
    pub fn text_color(&self) -> &'static str {
        self.background.text_color()
    }

    /// Temporary overrides, identifier → expiry.
    pub fn overrides(&self) -> &BTreeMap<AppId, EpochMillis> {
        &self.overrides
    }

    /// Installed apps that are not restricted.
    pub fn available_apps(&self) -> &[InstalledApp] {
        &self.available
    }

    /// Apps shown on the home screen.
    pub fn visible_apps(&self) -> &[InstalledApp] {
        &self.visible
    }

    /// Returns true if `id` is selected.
    pub fn is_selected(&self, id: &AppId) -> bool {
        self.selected.contains(id)
    }

    /// Returns true if `id` is restricted.
    pub fn is_restricted(&self, id: &AppId) -> bool {
        self.restricted.contains(id)
    }

    /// Expiry of `id`'s override, if it has one.
    pub fn override_expiry(&self, id: &AppId) -> Option<EpochMillis> {
        self.overrides.get(id).copied()
    }

    /// Looks up an installed app by identifier.
    pub fn installed_app(&self, id: &AppId) -> Option<&InstalledApp> {
        self.installed.iter().find(|app| &app.id == id)
    }

    /// Available apps sorted by name, filtered by a case-insensitive name
    /// substring. A blank term returns every available app.
    pub fn search_available(&self, term: &str) -> Vec<InstalledApp> {
        let mut sorted = self.available.clone();
        sorted.sort_by_cached_key(|app| app.name.to_lowercase());
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return sorted;
        }
        sorted.retain(|app| app.name_matches(&needle));
        sorted
    }
}
