//! Registration-system fetcher.
//!
//! The registration system expires sessions silently: instead of a status
//! code it either bounces the request off-origin or serves a
//! missing-cookie error page with 200. Each fetch therefore validates the
//! response and forces a fresh login before retrying.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use unipal_core::{CubicsTimetable, PageParser};
use unipal_fetch::{with_retry, FetchError, HttpRequest, HttpResponse, RetryPolicy};

use crate::error::ProviderError;
use crate::session::PortalSession;

/// Menu URL serving the timetable page.
const TIMETABLE_PATH: &str =
    "/unias/UnSSOLoginControl2?REQ_ACTION_DO=/ARF010.do&REQ_PRFR_MNU_ID=MNUIDSTD0103";

/// Error-page titles served with status 200 when the session is gone.
const INVALID_TITLES: [&str; 2] = [
    "<title>Missing cookie</title>",
    "<title>クッキーが見つかりません</title>",
];

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
const RETRY_JITTER: Duration = Duration::from_millis(300);

/// Authenticated registration-system client.
pub struct CubicsClient<P> {
    session: Arc<PortalSession>,
    parser: P,
}

impl<P: PageParser<CubicsTimetable>> CubicsClient<P> {
    /// Creates the client over a shared registration-system session.
    pub fn new(session: Arc<PortalSession>, parser: P) -> Self {
        Self { session, parser }
    }

    /// Fetches and parses the timetable grid.
    pub async fn timetable(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<CubicsTimetable, ProviderError> {
        let body = self.fetch_session_page(user_id, password, TIMETABLE_PATH).await?;
        Ok(self.parser.parse(&body)?)
    }

    /// Fetches a page, treating a silently expired session as retryable.
    /// The jar is invalidated before each retry so the next attempt runs a
    /// full login. Exhaustion surfaces as [`FetchError::ExpiredSession`].
    async fn fetch_session_page(
        &self,
        user_id: &str,
        password: &str,
        path: &str,
    ) -> Result<String, FetchError> {
        let policy = RetryPolicy::new(RETRY_ATTEMPTS)
            .with_base_delay(RETRY_BASE_DELAY)
            .with_jitter(RETRY_JITTER);

        with_retry(policy, |attempt| {
            let url = self.session.url(path);
            async move {
                let response = self
                    .session
                    .request(user_id, password, HttpRequest::get(url))
                    .await?;
                if self.session_valid(&response) {
                    Ok(response.body)
                } else {
                    warn!(attempt, "Registration-system session rejected, forcing re-login");
                    self.session.invalidate().await;
                    Err(FetchError::ExpiredSession)
                }
            }
        })
        .await
    }

    fn session_valid(&self, response: &HttpResponse) -> bool {
        if !response.final_url.starts_with(self.session.base_url()) {
            return false;
        }
        !INVALID_TITLES.iter().any(|t| response.body.contains(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use unipal_core::ParseError;
    use unipal_fetch::{AuthController, Transport};

    use crate::endpoints::PortalEndpoints;
    use crate::session::tests::CountingSurface;

    /// Serves scripted invalid responses before turning valid.
    struct FlakyTransport {
        invalid_before: u32,
        sends: AtomicU32,
    }

    impl FlakyTransport {
        fn new(invalid_before: u32) -> Self {
            Self {
                invalid_before,
                sends: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
            let n = self.sends.fetch_add(1, Ordering::SeqCst);
            if n < self.invalid_before {
                Ok(HttpResponse {
                    final_url: request.url,
                    status: 200,
                    body: "<title>Missing cookie</title>".into(),
                })
            } else {
                Ok(HttpResponse {
                    final_url: request.url,
                    status: 200,
                    body: "<html>grid</html>".into(),
                })
            }
        }
    }

    fn client(
        invalid_before: u32,
    ) -> (
        CubicsClient<impl PageParser<CubicsTimetable>>,
        Arc<CountingSurface>,
    ) {
        let surface = Arc::new(CountingSurface::new());
        let auth = Arc::new(AuthController::new(
            surface.clone(),
            "https://idp.example.test/login",
        ));
        let session = Arc::new(PortalSession::new(
            PortalEndpoints {
                base_url: "https://regsys.example.test".into(),
                auth_enter_path: "/sso".into(),
                auth_goal_path: "/sso".into(),
            },
            chrono::Duration::minutes(25),
            auth,
            Arc::new(FlakyTransport::new(invalid_before)),
        ));
        let parser = |raw: &str| -> Result<CubicsTimetable, ParseError> {
            assert!(raw.contains("grid"));
            Ok(CubicsTimetable::default())
        };
        (CubicsClient::new(session, parser), surface)
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_invalid_responses_force_two_reauths_then_succeed() {
        let (client, surface) = client(2);
        client.timetable("t123456", "pw").await.unwrap();
        // Initial login plus one forced re-login per invalid response.
        assert_eq!(surface.drives.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_invalid_exhausts_as_expired_session() {
        let (client, surface) = client(u32::MAX);
        let err = client.timetable("t123456", "pw").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Fetch(FetchError::ExpiredSession)
        ));
        assert_eq!(surface.drives.load(Ordering::SeqCst), 3);
    }
}
