//! Core type definitions for the Focus launcher.
//!
//! This crate defines the small, platform-agnostic types shared by the
//! storage adapters and the policy engine:
//! - Application identifiers and the installed-app record
//! - Epoch-millisecond time helpers used for override expiry
//! - Hex background colors and the derived text contrast color
//!
//! Nothing in here touches storage or the device; those seams live in
//! `focus-storage` and `focus-policy`.

mod app;
mod color;
mod ids;
mod time;

pub use app::InstalledApp;
pub use color::{text_color_for, HexColor, BLACK, WHITE};
pub use ids::AppId;
pub use time::{unix_time_ms_now, EpochMillis};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid app identifier: {0:?}")]
    InvalidAppId(String),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}
