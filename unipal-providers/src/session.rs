//! Shared authenticated session for one SSO-protected service.
//!
//! Each service keeps its own cookie jar; jars rot after
//! [`ServiceEndpoints::rotten_period`](crate::ServiceEndpoints) and are
//! refreshed through the shared [`AuthController`]. The jar lock is not
//! held across the interactive login, so two callers racing a rotten jar
//! may both enqueue a login; the controller serializes them and the later
//! result simply overwrites the earlier cookies.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use unipal_fetch::{
    AuthController, Credential, FetchError, HttpRequest, HttpResponse, SessionCookieJar, Transport,
};

use crate::endpoints::PortalEndpoints;

/// One service's authenticated session.
pub struct PortalSession {
    endpoints: PortalEndpoints,
    rotten_period: Duration,
    jar: Mutex<SessionCookieJar>,
    auth: Arc<AuthController>,
    transport: Arc<dyn Transport>,
}

impl PortalSession {
    /// Creates a session with an empty (hence rotten) jar.
    pub fn new(
        endpoints: PortalEndpoints,
        rotten_period: Duration,
        auth: Arc<AuthController>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            endpoints,
            rotten_period,
            jar: Mutex::new(SessionCookieJar::new()),
            auth,
            transport,
        }
    }

    /// The service origin.
    pub fn base_url(&self) -> &str {
        &self.endpoints.base_url
    }

    /// Joins a path onto the service origin.
    pub fn url(&self, path: &str) -> String {
        self.endpoints.url(path)
    }

    /// Returns the `Cookie` header for the current session, running the
    /// interactive login first when the jar is rotten.
    pub async fn cookie_header(&self, user_id: &str, password: &str) -> Result<String, FetchError> {
        {
            let jar = self.jar.lock().await;
            if !jar.is_stale(self.rotten_period) {
                return Ok(jar.cookies().to_header_value());
            }
        }

        debug!(service = %self.endpoints.base_url, "Session rotten, re-authenticating");
        let cookies = self
            .auth
            .authenticate(Credential {
                entry_url: self.endpoints.entry_url(),
                goal_url: self.endpoints.goal_url(),
                user_id: user_id.to_string(),
                password: password.to_string(),
            })
            .await?;

        let mut jar = self.jar.lock().await;
        jar.store(cookies);
        Ok(jar.cookies().to_header_value())
    }

    /// Sends a request with the session cookie attached. The portals only
    /// render the scraped pages in Japanese, hence the fixed language
    /// header.
    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn request(
        &self,
        user_id: &str,
        password: &str,
        request: HttpRequest,
    ) -> Result<HttpResponse, FetchError> {
        let cookie = self.cookie_header(user_id, password).await?;
        self.transport
            .send(
                request
                    .header("Cookie", cookie)
                    .header("Accept-Language", "ja"),
            )
            .await
    }

    /// Empties the jar so the next request re-authenticates.
    pub async fn invalidate(&self) {
        self.jar.lock().await.clear();
    }

    /// Forces one full login, discarding any existing session. Used to
    /// verify credentials before persisting them.
    pub async fn auth_test(&self, user_id: &str, password: &str) -> Result<(), FetchError> {
        self.invalidate().await;
        self.cookie_header(user_id, password).await.map(|_| ())
    }
}
