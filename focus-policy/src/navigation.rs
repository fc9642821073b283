//! Presentation navigation seam used by the sweeper.

use focus_types::AppId;

/// The presentation layer's current navigation state.
///
/// When an override lapses while the user is on that app's detail page, the
/// page no longer reflects policy and must be left.
pub trait NavigationContext: Send + Sync {
    /// Identifier whose detail view is currently shown, if any.
    fn current_detail(&self) -> Option<AppId>;

    /// Navigates back to the home view.
    fn redirect_home(&self);

    /// Returns true if `id`'s detail view is currently shown.
    fn is_showing_detail(&self, id: &AppId) -> bool {
        self.current_detail().as_ref() == Some(id)
    }
}

/// Navigation context for headless use; never shows a detail view.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigation;

impl NavigationContext for NoopNavigation {
    fn current_detail(&self) -> Option<AppId> {
        None
    }

    fn redirect_home(&self) {}
}
