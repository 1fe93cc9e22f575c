//! Portal fetcher.
//!
//! The portal exposes JSON APIs behind the same SSO; responses still go
//! through the injected parser set since the payload shapes shift between
//! portal releases.

use std::sync::Arc;

use unipal_core::{AlboCalendar, AlboInformation, AlboTimetable, PageParser};
use unipal_fetch::HttpRequest;

use crate::error::ProviderError;
use crate::session::PortalSession;

const TIMETABLE_PATH: &str = "/api/class/time-table/";
const CALENDAR_PATH: &str = "/api/calendar/?page_size=1000";
const INFORMATION_PATH: &str = "/api/information/1?page_size=20&category_uuid=";

/// Parser set for the portal APIs.
pub trait AlboParsers: Send + Sync {
    /// Timetable response parser.
    fn timetable(&self) -> &dyn PageParser<AlboTimetable>;
    /// Calendar response parser.
    fn calendar(&self) -> &dyn PageParser<AlboCalendar>;
    /// Information response parser.
    fn information(&self) -> &dyn PageParser<AlboInformation>;
}

/// Authenticated portal client.
pub struct AlboClient<P> {
    session: Arc<PortalSession>,
    parsers: P,
}

impl<P: AlboParsers> AlboClient<P> {
    /// Creates the client over a shared portal session.
    pub fn new(session: Arc<PortalSession>, parsers: P) -> Self {
        Self { session, parsers }
    }

    async fn get(&self, user_id: &str, password: &str, path: &str) -> Result<String, ProviderError> {
        let request = HttpRequest::get(self.session.url(path));
        let response = self.session.request(user_id, password, request).await?;
        Ok(response.body)
    }

    /// Fetches the term timetable items.
    pub async fn timetable(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<AlboTimetable, ProviderError> {
        let body = self.get(user_id, password, TIMETABLE_PATH).await?;
        Ok(self.parsers.timetable().parse(&body)?)
    }

    /// Fetches the academic calendar.
    pub async fn calendar(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<AlboCalendar, ProviderError> {
        let body = self.get(user_id, password, CALENDAR_PATH).await?;
        Ok(self.parsers.calendar().parse(&body)?)
    }

    /// Fetches the notice feed.
    pub async fn information(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<AlboInformation, ProviderError> {
        let body = self.get(user_id, password, INFORMATION_PATH).await?;
        Ok(self.parsers.information().parse(&body)?)
    }
}
