//! App visibility policy engine for the Focus launcher.
//!
//! Decides which installed applications the user may see and launch, and for
//! how long. The presentation layer only reads views and calls mutations.
//!
//! # Architecture
//!
//! - **PolicyStore**: single owner of the selected set, restricted set,
//!   selection limit, background color and temporary overrides. Mutations
//!   enforce the cross-set invariants, publish a fresh [`PolicyView`] and
//!   persist each affected key through a [`PrefsStore`](focus_storage::PrefsStore).
//! - **PolicyView**: immutable snapshot carrying the derived `available` and
//!   `visible` app lists, distributed through a `tokio::sync::watch` channel.
//! - **ExpirySweeper**: one cancellable recurring task that re-restricts
//!   lapsed overrides and steers navigation away from newly hidden apps.
//! - **Seams**: [`AppCatalog`] (installed apps), [`NavigationContext`]
//!   (presentation routing) and [`Clock`] (epoch time) are injected.
//!
//! ## Invariants
//!
//! 1. The selected set never exceeds the selection limit.
//! 2. A restricted app is never selected, unless it is essential.
//! 3. An app with a temporary override is not restricted; if persisted
//!    state says otherwise, restriction wins at load time.
//! 4. Essential apps are visible whenever they are installed.
//!
//! # Example
//!
//! ```
//! use focus_policy::{PolicyConfig, PolicyStore, StaticCatalog};
//! use focus_storage::MemoryPrefsStore;
//! use focus_types::{AppId, InstalledApp};
//! use std::sync::Arc;
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! rt.block_on(async {
//!     let catalog = StaticCatalog::new(vec![InstalledApp::new("Maps", "com.maps")]);
//!     let store = PolicyStore::new(
//!         Arc::new(MemoryPrefsStore::new()),
//!         Arc::new(catalog),
//!         PolicyConfig::default(),
//!     );
//!     store.load_all().await;
//!
//!     assert!(store.toggle_selection(&AppId::new("com.maps"), true).await);
//!     assert_eq!(store.snapshot().visible_apps().len(), 1);
//! });
//! ```

mod catalog;
mod clock;
mod config;
mod error;
mod navigation;
mod overrides;
mod store;
mod sweeper;
mod view;

pub use catalog::{AppCatalog, StaticCatalog, UnsupportedCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    clamp_selection_limit, PolicyConfig, DEFAULT_SELECTION_LIMIT, DEFAULT_SWEEP_INTERVAL_MS,
    MAX_SELECTION_LIMIT, MIN_SELECTION_LIMIT,
};
pub use error::{CatalogError, CatalogResult, PolicyError, PolicyResult};
pub use navigation::{NavigationContext, NoopNavigation};
pub use overrides::OverrideSchedule;
pub use store::{LimitOutcome, PolicyStore, RestrictionOutcome, SelectionOutcome};
pub use sweeper::{ExpirySweeper, SweeperHandle};
pub use view::PolicyView;
