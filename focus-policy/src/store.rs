//! The policy store: single owner of launcher policy state.
//!
//! Every mutation runs under one async mutex, updates the in-memory state,
//! publishes a fresh [`PolicyView`], then writes the affected keys in mutation
//! order while still holding the lock. Persistence failures are logged and
//! never roll back memory.

use focus_storage::{keys, load_json, save_json, PrefsStore, StorageResult};
use focus_types::{text_color_for, AppId, EpochMillis, HexColor, InstalledApp};
use indexmap::IndexSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::catalog::AppCatalog;
use crate::config::{clamp_selection_limit, PolicyConfig, MAX_SELECTION_LIMIT};
use crate::overrides::OverrideSchedule;
use crate::view::PolicyView;

/// Result of an operation that may trim the selected set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// True if entries were dropped to fit the limit.
    pub trimmed: bool,
    /// Selected set after the operation.
    pub selected: Vec<AppId>,
}

/// Result of [`PolicyStore::set_selection_limit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOutcome {
    /// Limit after clamping.
    pub limit: usize,
    /// True if the selected set was cut down to the new limit.
    pub trimmed: bool,
    /// Selected set after the operation.
    pub selected: Vec<AppId>,
}

/// Result of [`PolicyStore::set_restricted_apps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionOutcome {
    /// Restricted set after the operation.
    pub restricted: Vec<AppId>,
    /// Identifiers removed from the selected set because they became restricted.
    pub deselected: Vec<AppId>,
}

#[derive(Debug)]
struct PolicyState {
    revision: u64,
    installed: Arc<Vec<InstalledApp>>,
    selected: IndexSet<AppId>,
    restricted: IndexSet<AppId>,
    limit: usize,
    background: HexColor,
    overrides: OverrideSchedule,
}

/// Owner of selected/restricted sets, selection limit, background color and
/// temporary overrides.
///
/// Construct one per process and share it behind an `Arc`. Call
/// [`load_all`](Self::load_all) (or the individual `load_*` methods) before
/// relying on the views.
pub struct PolicyStore {
    prefs: Arc<dyn PrefsStore>,
    catalog: Arc<dyn AppCatalog>,
    config: PolicyConfig,
    state: Mutex<PolicyState>,
    view_tx: watch::Sender<Arc<PolicyView>>,
}

impl PolicyStore {
    /// Creates a store with default in-memory state. Nothing is read until a
    /// `load_*` method runs.
    pub fn new(
        prefs: Arc<dyn PrefsStore>,
        catalog: Arc<dyn AppCatalog>,
        config: PolicyConfig,
    ) -> Self {
        let state = PolicyState {
            revision: 0,
            installed: Arc::new(Vec::new()),
            selected: IndexSet::new(),
            restricted: IndexSet::new(),
            limit: config.default_limit(),
            background: config.default_background_color.clone(),
            overrides: OverrideSchedule::new(),
        };
        let initial = build_view(&state, &config);
        let (view_tx, _) = watch::channel(Arc::new(initial));
        Self {
            prefs,
            catalog,
            config,
            state: Mutex::new(state),
            view_tx,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Current snapshot. Never blocks on mutations.
    pub fn snapshot(&self) -> Arc<PolicyView> {
        self.view_tx.borrow().clone()
    }

    /// Receiver notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PolicyView>> {
        self.view_tx.subscribe()
    }

    /// Expiry of `id`'s temporary override.
    pub fn override_expiry(&self, id: &AppId) -> Option<EpochMillis> {
        self.view_tx.borrow().override_expiry(id)
    }

    /// Text color for `background`, or for the stored background when `None`.
    /// Malformed input yields white text.
    pub fn text_color(&self, background: Option<&str>) -> &'static str {
        match background {
            Some(raw) => text_color_for(raw),
            None => self.view_tx.borrow().text_color(),
        }
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Loads every piece of state in dependency order: installed apps,
    /// limit, restricted, selected, overrides, background color.
    pub async fn load_all(&self) {
        self.load_installed_apps().await;
        self.load_limit().await;
        self.load_restricted().await;
        self.load_selected().await;
        self.load_overrides().await;
        self.load_background_color().await;
    }

    /// Replaces the installed-app list from the catalog.
    ///
    /// Unsupported catalogs are skipped; a failing catalog leaves the previous
    /// list in place. The lock is held across the fetch so concurrent reloads
    /// land in call order.
    pub async fn load_installed_apps(&self) {
        if !self.catalog.is_supported() {
            debug!("App catalog unsupported on this platform, skipping load");
            return;
        }
        let mut state = self.state.lock().await;
        match self.catalog.list_installed_apps().await {
            Ok(apps) => {
                info!("Installed apps retrieved: {}", apps.len());
                state.installed = Arc::new(apps);
                self.publish(&mut state);
            }
            Err(e) => warn!("Failed to load installed apps: {}", e),
        }
    }

    /// Loads the selected set, enforcing the limit and restriction rules.
    pub async fn load_selected(&self) {
        let loaded = self.load_id_list(keys::SELECTED_APPS).await;
        let mut state = self.state.lock().await;
        state.selected = loaded;
        let changed = self.normalize_selection(&mut state);
        self.publish(&mut state);
        if changed {
            self.persist_selected(&state).await;
        }
    }

    /// Loads the restricted set, then drops newly restricted apps from the
    /// selection and from the override schedule.
    pub async fn load_restricted(&self) {
        let loaded = self.load_id_list(keys::RESTRICTED_APPS).await;
        let mut state = self.state.lock().await;
        state.restricted = loaded;
        let deselected = self.normalize_selection(&mut state);
        let dropped = drop_restricted_overrides(&mut state);
        self.publish(&mut state);
        if deselected {
            self.persist_selected(&state).await;
        }
        if !dropped.is_empty() {
            self.persist_overrides(&state).await;
        }
    }

    /// Loads the selection limit; non-finite or non-positive values fall back
    /// to the configured default.
    pub async fn load_limit(&self) {
        let raw = self.read_raw(keys::SELECTION_LIMIT).await;
        let limit = match raw.as_deref().map(parse_limit) {
            Some(Some(limit)) => limit,
            Some(None) => {
                warn!("Ignoring invalid selection limit {:?}", raw);
                self.config.default_limit()
            }
            None => self.config.default_limit(),
        };
        let mut state = self.state.lock().await;
        state.limit = limit;
        let trimmed = self.normalize_selection(&mut state);
        self.publish(&mut state);
        if trimmed {
            self.persist_selected(&state).await;
        }
    }

    /// Loads the background color, falling back to the configured default.
    pub async fn load_background_color(&self) {
        let raw = self.read_raw(keys::BACKGROUND_COLOR).await;
        let color = match raw.as_deref().map(parse_color) {
            Some(Some(color)) => color,
            Some(None) => {
                warn!("Ignoring invalid background color {:?}", raw);
                self.config.default_background_color.clone()
            }
            None => self.config.default_background_color.clone(),
        };
        let mut state = self.state.lock().await;
        state.background = color;
        self.publish(&mut state);
    }

    /// Loads temporary overrides. Entries for apps that are also restricted
    /// are discarded: restriction wins over a half-applied expiry.
    pub async fn load_overrides(&self) {
        let entries = match load_json::<_, Vec<(AppId, f64)>>(
            self.prefs.as_ref(),
            keys::TEMPORARY_UNRESTRICTIONS,
        )
        .await
        {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable temporary overrides: {}", e);
                Vec::new()
            }
        };
        let schedule = OverrideSchedule::from_entries(
            entries
                .into_iter()
                .filter(|(_, expiry)| expiry.is_finite() && *expiry >= 0.0)
                .map(|(id, expiry)| (id, expiry as EpochMillis)),
        );

        let mut state = self.state.lock().await;
        state.overrides = schedule;
        let dropped = drop_restricted_overrides(&mut state);
        self.publish(&mut state);
        if !dropped.is_empty() {
            info!("Discarded {} overrides for restricted apps", dropped.len());
            self.persist_overrides(&state).await;
        }
    }

    // ── Selection ────────────────────────────────────────────────

    /// Adds or removes `id` from the home selection.
    ///
    /// Returns false, without mutating or persisting, when selecting would
    /// exceed the limit or `id` is restricted (and not essential).
    pub async fn toggle_selection(&self, id: &AppId, selected: bool) -> bool {
        let mut state = self.state.lock().await;
        if selected {
            if state.selected.contains(id) {
                return true;
            }
            if state.selected.len() >= state.limit {
                debug!("Selection of {} rejected: limit {} reached", id, state.limit);
                return false;
            }
            if state.restricted.contains(id) && !self.config.is_essential(id) {
                debug!("Selection of {} rejected: app is restricted", id);
                return false;
            }
            state.selected.insert(id.clone());
        } else if !state.selected.shift_remove(id) {
            return true;
        }
        self.publish(&mut state);
        self.persist_selected(&state).await;
        true
    }

    /// Replaces the selected set, truncating to the limit in caller order.
    /// Restricted non-essential identifiers and duplicates are dropped first.
    ///
    /// `trimmed` is only reported when truncation changed the stored
    /// selection, so repeating a call reports no second trim.
    pub async fn set_selected_apps<I>(&self, ids: I) -> SelectionOutcome
    where
        I: IntoIterator<Item = AppId>,
    {
        let mut state = self.state.lock().await;
        let mut next: IndexSet<AppId> = ids
            .into_iter()
            .filter(|id| !state.restricted.contains(id) || self.config.is_essential(id))
            .collect();
        let over_limit = next.len() > state.limit;
        next.truncate(state.limit);
        let trimmed = over_limit && !next.iter().eq(state.selected.iter());
        if trimmed {
            info!("Selection trimmed to limit {}", state.limit);
        }
        state.selected = next;
        self.publish(&mut state);
        self.persist_selected(&state).await;
        SelectionOutcome {
            trimmed,
            selected: state.selected.iter().cloned().collect(),
        }
    }

    /// Clamps and stores a new limit, trimming the selection if it no longer fits.
    pub async fn set_selection_limit(&self, requested: i64) -> LimitOutcome {
        let limit = clamp_selection_limit(requested);
        if limit as i64 != requested {
            debug!("Selection limit {} clamped to {}", requested, limit);
        }
        let mut state = self.state.lock().await;
        state.limit = limit;
        let trimmed = state.selected.len() > limit;
        state.selected.truncate(limit);
        self.publish(&mut state);
        self.persist_limit(&state).await;
        if trimmed {
            self.persist_selected(&state).await;
        }
        LimitOutcome {
            limit,
            trimmed,
            selected: state.selected.iter().cloned().collect(),
        }
    }

    // ── Restriction ──────────────────────────────────────────────

    /// Restricts or unrestricts `id`. Always succeeds.
    ///
    /// Restricting removes `id` from the selection (unless essential) and
    /// cancels any pending override. Unrestricting also cancels a pending
    /// override, making the unrestriction permanent.
    pub async fn toggle_restriction(&self, id: &AppId, restricted: bool) -> bool {
        let mut state = self.state.lock().await;
        let mut deselected = false;
        if restricted {
            state.restricted.insert(id.clone());
            if !self.config.is_essential(id) {
                deselected = state.selected.shift_remove(id);
            }
        } else {
            state.restricted.shift_remove(id);
        }
        let cancelled = state.overrides.remove(id).is_some();
        self.publish(&mut state);

        self.persist_restricted(&state).await;
        if deselected {
            self.persist_selected(&state).await;
        }
        if cancelled {
            self.persist_overrides(&state).await;
        }
        true
    }

    /// Replaces the restricted set and reconciles the selection and overrides.
    pub async fn set_restricted_apps<I>(&self, ids: I) -> RestrictionOutcome
    where
        I: IntoIterator<Item = AppId>,
    {
        let mut state = self.state.lock().await;
        state.restricted = ids.into_iter().collect();

        let before: Vec<AppId> = state.selected.iter().cloned().collect();
        let changed = self.normalize_selection(&mut state);
        let deselected = before
            .into_iter()
            .filter(|id| !state.selected.contains(id))
            .collect();
        let dropped = drop_restricted_overrides(&mut state);
        self.publish(&mut state);

        self.persist_restricted(&state).await;
        if changed {
            self.persist_selected(&state).await;
        }
        if !dropped.is_empty() {
            self.persist_overrides(&state).await;
        }
        RestrictionOutcome {
            restricted: state.restricted.iter().cloned().collect(),
            deselected,
        }
    }

    // ── Temporary overrides ──────────────────────────────────────

    /// Temporarily lifts `id`'s restriction until `expiry`.
    ///
    /// Only restricted apps, or apps whose override is being extended, are
    /// accepted; anything else returns false.
    pub async fn set_temporary_override(&self, id: &AppId, expiry: EpochMillis) -> bool {
        let mut state = self.state.lock().await;
        if !state.restricted.contains(id) && !state.overrides.contains(id) {
            debug!("Override for {} rejected: app is not restricted", id);
            return false;
        }
        let was_restricted = state.restricted.shift_remove(id);
        state.overrides.insert(id.clone(), expiry);
        self.publish(&mut state);

        // Overrides first: a crash in between leaves the app restricted.
        self.persist_overrides(&state).await;
        if was_restricted {
            self.persist_restricted(&state).await;
        }
        info!("Temporarily unrestricted {} until {}", id, expiry);
        true
    }

    /// Drops `id`'s override without re-restricting it. Returns true if an
    /// override existed.
    pub async fn clear_temporary_override(&self, id: &AppId) -> bool {
        let mut state = self.state.lock().await;
        if state.overrides.remove(id).is_none() {
            return false;
        }
        self.publish(&mut state);
        self.persist_overrides(&state).await;
        true
    }

    /// Re-restricts every override due at `now` and removes it from the
    /// schedule, as one step per identifier. Returns the expired identifiers,
    /// earliest first.
    pub async fn expire_due_overrides(&self, now: EpochMillis) -> Vec<AppId> {
        let mut state = self.state.lock().await;
        let due = state.overrides.due(now);
        if due.is_empty() {
            return due;
        }
        let mut deselected = false;
        for id in &due {
            state.restricted.insert(id.clone());
            if !self.config.is_essential(id) {
                deselected |= state.selected.shift_remove(id);
            }
            state.overrides.remove(id);
            self.publish(&mut state);
        }

        // Restriction first: a crash before the override write is repaired
        // on the next load.
        self.persist_restricted(&state).await;
        if deselected {
            self.persist_selected(&state).await;
        }
        self.persist_overrides(&state).await;
        info!("Expired {} temporary overrides", due.len());
        due
    }

    // ── Appearance ───────────────────────────────────────────────

    /// Stores a new `#RRGGBB` background. Malformed input is rejected.
    pub async fn set_background_color(&self, raw: &str) -> bool {
        let Ok(color) = HexColor::parse(raw) else {
            debug!("Rejected background color {:?}", raw);
            return false;
        };
        let mut state = self.state.lock().await;
        state.background = color;
        self.publish(&mut state);
        let value = state.background.as_str().to_string();
        self.write(keys::BACKGROUND_COLOR, self.prefs.set(keys::BACKGROUND_COLOR, &value).await);
        true
    }

    // ── Internals ────────────────────────────────────────────────

    /// Drops restricted non-essential ids and truncates to the limit.
    /// Returns true if the selection changed.
    fn normalize_selection(&self, state: &mut PolicyState) -> bool {
        let before = state.selected.len();
        let PolicyState {
            selected,
            restricted,
            limit,
            ..
        } = state;
        selected.retain(|id| !restricted.contains(id) || self.config.is_essential(id));
        selected.truncate(*limit);
        state.selected.len() != before
    }

    fn publish(&self, state: &mut PolicyState) {
        state.revision += 1;
        self.view_tx
            .send_replace(Arc::new(build_view(state, &self.config)));
    }

    async fn read_raw(&self, key: &str) -> Option<String> {
        match self.prefs.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    async fn load_id_list(&self, key: &str) -> IndexSet<AppId> {
        match load_json::<_, Vec<AppId>>(self.prefs.as_ref(), key).await {
            Ok(ids) => ids.unwrap_or_default().into_iter().collect(),
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", key, e);
                IndexSet::new()
            }
        }
    }

    async fn persist_selected(&self, state: &PolicyState) {
        let ids: Vec<&AppId> = state.selected.iter().collect();
        self.write(
            keys::SELECTED_APPS,
            save_json(self.prefs.as_ref(), keys::SELECTED_APPS, &ids).await,
        );
    }

    async fn persist_restricted(&self, state: &PolicyState) {
        let ids: Vec<&AppId> = state.restricted.iter().collect();
        self.write(
            keys::RESTRICTED_APPS,
            save_json(self.prefs.as_ref(), keys::RESTRICTED_APPS, &ids).await,
        );
    }

    async fn persist_limit(&self, state: &PolicyState) {
        let raw = state.limit.to_string();
        self.write(keys::SELECTION_LIMIT, self.prefs.set(keys::SELECTION_LIMIT, &raw).await);
    }

    async fn persist_overrides(&self, state: &PolicyState) {
        let entries = state.overrides.entries();
        self.write(
            keys::TEMPORARY_UNRESTRICTIONS,
            save_json(self.prefs.as_ref(), keys::TEMPORARY_UNRESTRICTIONS, &entries).await,
        );
    }

    fn write(&self, key: &str, result: StorageResult<()>) {
        if let Err(e) = result {
            warn!("Failed to persist {}: {} (in-memory state kept)", key, e);
        }
    }
}

fn build_view(state: &PolicyState, config: &PolicyConfig) -> PolicyView {
    PolicyView::compute(
        state.revision,
        Arc::clone(&state.installed),
        &state.selected,
        &state.restricted,
        &config.essential_apps,
        state.limit,
        state.background.clone(),
        state.overrides.as_map().clone(),
    )
}

fn drop_restricted_overrides(state: &mut PolicyState) -> Vec<AppId> {
    let PolicyState {
        restricted,
        overrides,
        ..
    } = state;
    overrides.remove_where(|id| restricted.contains(id))
}

/// Parses a persisted limit. Accepts a bare or JSON-quoted decimal; rejects
/// non-finite and non-positive values.
fn parse_limit(raw: &str) -> Option<usize> {
    let value: f64 = raw.trim().trim_matches('"').trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let whole = value.floor().min(MAX_SELECTION_LIMIT as f64);
    Some(clamp_selection_limit(whole as i64))
}

/// Parses a persisted color, tolerating a JSON-quoted value.
fn parse_color(raw: &str) -> Option<HexColor> {
    HexColor::parse(raw)
        .or_else(|_| HexColor::parse(raw.trim().trim_matches('"')))
        .ok()
}
