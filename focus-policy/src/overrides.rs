//! Expiry-ordered schedule of temporary restriction overrides.

use focus_types::{AppId, EpochMillis};
use std::collections::{BTreeMap, BTreeSet};

/// Temporary overrides indexed both by identifier and by expiry.
///
/// The expiry index lets a sweep visit only the entries that are due instead
/// of scanning every override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSchedule {
    by_id: BTreeMap<AppId, EpochMillis>,
    by_expiry: BTreeSet<(EpochMillis, AppId)>,
}

impl OverrideSchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from `(id, expiry)` pairs; later duplicates win.
    pub fn from_entries(entries: impl IntoIterator<Item = (AppId, EpochMillis)>) -> Self {
        let mut schedule = Self::new();
        for (id, expiry) in entries {
            schedule.insert(id, expiry);
        }
        schedule
    }

    /// Sets the expiry for `id`, returning the previous expiry if any.
    pub fn insert(&mut self, id: AppId, expiry: EpochMillis) -> Option<EpochMillis> {
        let previous = self.by_id.insert(id.clone(), expiry);
        if let Some(old) = previous {
            self.by_expiry.remove(&(old, id.clone()));
        }
        self.by_expiry.insert((expiry, id));
        previous
    }

    /// Removes the override for `id`, returning its expiry if it existed.
    pub fn remove(&mut self, id: &AppId) -> Option<EpochMillis> {
        let expiry = self.by_id.remove(id)?;
        self.by_expiry.remove(&(expiry, id.clone()));
        Some(expiry)
    }

    /// Expiry for `id`.
    pub fn get(&self, id: &AppId) -> Option<EpochMillis> {
        self.by_id.get(id).copied()
    }

    /// Returns true if `id` has an override.
    pub fn contains(&self, id: &AppId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Identifiers whose expiry is at or before `now`, earliest first.
    pub fn due(&self, now: EpochMillis) -> Vec<AppId> {
        self.by_expiry
            .iter()
            .take_while(|(expiry, _)| *expiry <= now)
            .map(|(_, id)| id.clone())
            .collect()
    }

    /// Earliest pending expiry.
    pub fn next_expiry(&self) -> Option<EpochMillis> {
        self.by_expiry.first().map(|(expiry, _)| *expiry)
    }

    /// Removes every override whose identifier matches `pred`, returning them.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&AppId) -> bool) -> Vec<AppId> {
        let doomed: Vec<AppId> = self.by_id.keys().filter(|id| pred(id)).cloned().collect();
        for id in &doomed {
            self.remove(id);
        }
        doomed
    }

    /// `(id, expiry)` pairs ordered by expiry; this is the persisted shape.
    pub fn entries(&self) -> Vec<(AppId, EpochMillis)> {
        self.by_expiry
            .iter()
            .map(|(expiry, id)| (id.clone(), *expiry))
            .collect()
    }

    /// Identifier → expiry map.
    pub fn as_map(&self) -> &BTreeMap<AppId, EpochMillis> {
        &self.by_id
    }

    /// Number of overrides.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
