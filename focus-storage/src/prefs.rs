//! The preference store contract and typed JSON helpers.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageResult;

/// Durable key→string store.
///
/// Implementations must apply writes to the same key in call order.
#[async_trait]
pub trait PrefsStore: Send + Sync {
    /// Returns the raw value for `key`, if present.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Loads and deserializes a JSON value stored under `key`.
///
/// # Errors
///
/// Returns an error when the store read or JSON deserialization fails.
pub async fn load_json<S, T>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    S: PrefsStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Serializes `value` as JSON and stores it under `key`.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_json<S, T>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    S: PrefsStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
