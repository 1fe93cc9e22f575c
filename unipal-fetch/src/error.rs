//! Error taxonomy for the fetch layer.

use thiserror::Error;

/// Errors raised by the browsing surface driving the SSO flow.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface implementation failed to load or run the entry page.
    #[error("Browsing surface failed: {0}")]
    Driver(String),

    /// The surface was closed before the injected script posted a message.
    #[error("Browsing surface closed before posting a result")]
    Closed,
}

/// Errors raised by authentication, transport, and session handling.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The identity provider rejected the supplied credentials.
    #[error("Authentication rejected by the identity provider")]
    Unauthorized,

    /// The login flow completed but produced no usable session cookies,
    /// or the auth pipeline failed internally.
    #[error("Authentication process did not produce a session")]
    AuthProcess,

    /// The session was repeatedly rejected by the upstream service even
    /// after re-authentication.
    #[error("Session expired and could not be re-established")]
    ExpiredSession,

    /// A request or the interactive login exceeded its deadline.
    #[error("Request deadline exceeded")]
    Timeout,

    /// Transport-level failure, or a non-success HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The portal answered 503; scraped services are under maintenance.
    #[error("Portal is under maintenance")]
    PortalMaintenance,

    /// The backend API answered 503.
    #[error("Backend API is under maintenance")]
    ApiMaintenance,

    /// A request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The browsing surface failed while driving the login flow.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl FetchError {
    /// Maps a reqwest failure onto the taxonomy. Timeouts get their own
    /// variant so callers can distinguish them from connectivity failures.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
