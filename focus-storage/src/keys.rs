//! Persisted key names.
//!
//! These match the keys written by earlier releases of the launcher, so they
//! must not be renamed.

/// JSON array of identifiers shown on the home screen.
pub const SELECTED_APPS: &str = "selectedApps";
/// JSON array of restricted identifiers.
pub const RESTRICTED_APPS: &str = "restrictedApps";
/// Decimal selection limit.
pub const SELECTION_LIMIT: &str = "selectionLimit";
/// `#RRGGBB` background color.
pub const BACKGROUND_COLOR: &str = "backgroundColor";
/// JSON array of `[identifier, expiryEpochMs]` pairs.
pub const TEMPORARY_UNRESTRICTIONS: &str = "temporaryUnrestrictions";
/// `"true"` once onboarding finished.
pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
