//! First-run onboarding flag.

use crate::error::StorageResult;
use crate::keys::ONBOARDING_COMPLETED;
use crate::prefs::PrefsStore;

/// Returns true once onboarding has been completed.
///
/// Anything other than the literal `"true"` (including a read failure) counts
/// as not completed, which sends the user back through onboarding.
pub async fn is_onboarding_completed<S: PrefsStore + ?Sized>(store: &S) -> bool {
    matches!(store.get(ONBOARDING_COMPLETED).await, Ok(Some(v)) if v == "true")
}

/// Marks onboarding as completed.
///
/// # Errors
///
/// Returns an error when the store write fails.
pub async fn mark_onboarding_completed<S: PrefsStore + ?Sized>(store: &S) -> StorageResult<()> {
    store.set(ONBOARDING_COMPLETED, "true").await
}
