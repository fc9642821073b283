//! Key/value preference storage for the Focus launcher.
//!
//! The launcher persists every piece of policy state under its own string key
//! with a string value (JSON where the value is composite). This crate defines
//! that contract and its adapters:
//!
//! - [`PrefsStore`]: the async `get`/`set`/`remove` seam the policy engine uses
//! - [`MemoryPrefsStore`]: process-local store for tests and previews
//! - [`JsonFilePrefsStore`]: a single JSON document on disk, for the CLI
//! - [`keys`]: the persisted key names
//! - typed JSON helpers and the onboarding flag
//!
//! Writes are independent per key. There is no multi-key transaction.

mod error;
mod file;
pub mod keys;
mod memory;
mod onboarding;
mod prefs;

pub use error::{StorageError, StorageResult};
pub use file::JsonFilePrefsStore;
pub use memory::MemoryPrefsStore;
pub use onboarding::{is_onboarding_completed, mark_onboarding_completed};
pub use prefs::{load_json, save_json, PrefsStore};
