//! Namespaced cache with fetch-through policy.
//!
//! Entries carry their write timestamp so callers can apply per-key
//! freshness rules. A structurally malformed entry is treated as absent
//! and deleted on read, so one bad write can never wedge a key forever.

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::storage::KeyValueStorage;

/// One cached value with its write timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Unix milliseconds at write time.
    pub stored_at: i64,
    /// The cached value.
    pub value: T,
}

impl<T> CacheEntry<T> {
    /// Time elapsed since the entry was written.
    pub fn age(&self) -> Duration {
        Duration::milliseconds(Utc::now().timestamp_millis() - self.stored_at)
    }
}

/// Freshness rules for one fetch-through call.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Cache key, unnamespaced.
    pub key: String,
    /// Entries younger than this are served without fetching.
    pub max_age: Duration,
    /// On fetch failure, entries younger than this are still served.
    /// Values below `max_age` are treated as `max_age`.
    pub stale_age: Duration,
}

/// Cache store over a pluggable storage, with a key namespace prefix.
pub struct CacheStore {
    namespace: String,
    storage: Arc<dyn KeyValueStorage>,
}

impl CacheStore {
    /// Creates a store whose keys are prefixed `"{namespace}."`.
    pub fn new(namespace: impl Into<String>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            namespace: namespace.into(),
            storage,
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}.{}", self.namespace, key)
    }

    /// Reads an entry. Malformed blobs are deleted and read as a miss.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<CacheEntry<T>>, StoreError> {
        let storage_key = self.storage_key(key);
        let Some(raw) = self.storage.get(&storage_key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Dropping malformed cache entry");
                self.storage.remove(&storage_key).await?;
                Ok(None)
            }
        }
    }

    /// Writes an entry stamped with the current time.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let entry = CacheEntry {
            stored_at: Utc::now().timestamp_millis(),
            value,
        };
        let raw = serde_json::to_string(&entry)?;
        self.storage.set(&self.storage_key(key), &raw).await
    }

    /// Deletes an entry.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove(&self.storage_key(key)).await
    }

    /// Serves a fresh cached value, otherwise fetches. A failed fetch
    /// falls back to any entry younger than the stale bound.
    pub async fn fetch_with_cache<T, E, F, Fut>(
        &self,
        policy: &FetchPolicy,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let stale_age = policy.stale_age.max(policy.max_age);
        let cached = match self.get::<T>(&policy.key).await? {
            Some(entry) if entry.age() < policy.max_age => {
                debug!(key = %policy.key, "Serving fresh cache entry");
                return Ok(entry.value);
            }
            other => other,
        };

        match fetcher().await {
            Ok(value) => {
                if let Err(e) = self.set(&policy.key, &value).await {
                    warn!(key = %policy.key, error = %e, "Failed to write cache entry");
                }
                Ok(value)
            }
            Err(err) => {
                if let Some(entry) = cached {
                    if entry.age() < stale_age {
                        warn!(key = %policy.key, "Fetch failed, serving stale cache entry");
                        return Ok(entry.value);
                    }
                }
                Err(err)
            }
        }
    }
}
