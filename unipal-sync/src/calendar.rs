//! Static campus documents: academic calendar and bus timetable.
//!
//! Both documents change rarely and are served straight through to the
//! host application, so they go through the cache's fetch-through policy
//! instead of a bespoke fallback path.

use std::sync::Arc;

use chrono::Duration;

use unipal_providers::HubApiClient;
use unipal_store::{CacheStore, FetchPolicy};

use crate::auth::AuthRepository;
use crate::error::SyncError;

const CALENDAR_CACHE_KEY: &str = "campus-calendar";
const BUS_CACHE_KEY: &str = "bus-timetable";

fn document_policy(key: &str) -> FetchPolicy {
    FetchPolicy {
        key: key.into(),
        max_age: Duration::hours(1),
        stale_age: Duration::days(7),
    }
}

/// Serves the static campus documents.
pub struct CalendarRepository {
    hub_api: Arc<HubApiClient>,
    cache: Arc<CacheStore>,
    auth: Arc<AuthRepository>,
}

impl CalendarRepository {
    /// Creates the repository.
    pub fn new(hub_api: Arc<HubApiClient>, cache: Arc<CacheStore>, auth: Arc<AuthRepository>) -> Self {
        Self {
            hub_api,
            cache,
            auth,
        }
    }

    /// The academic calendar document.
    pub async fn academic_calendar(&self) -> Result<serde_json::Value, SyncError> {
        let token = self.auth.id_token().await?;
        self.cache
            .fetch_with_cache(&document_policy(CALENDAR_CACHE_KEY), || async {
                self.hub_api
                    .calendar(&token)
                    .await
                    .map_err(SyncError::from)
            })
            .await
    }

    /// The bus timetable document.
    pub async fn bus_timetable(&self) -> Result<serde_json::Value, SyncError> {
        let token = self.auth.id_token().await?;
        self.cache
            .fetch_with_cache(&document_policy(BUS_CACHE_KEY), || async {
                self.hub_api
                    .bus_timetable(&token)
                    .await
                    .map_err(SyncError::from)
            })
            .await
    }
}
