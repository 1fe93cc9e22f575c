//! Browsing-surface seam for the interactive SSO flow.
//!
//! The SSO login runs inside an embedded browser the host application
//! owns. The pipeline drives it through [`BrowsingSurface`]: it hands over
//! an entry URL plus an injected script, waits for the script to post a
//! verdict, then harvests cookies for the landing origin.

use async_trait::async_trait;

use crate::cookie::CookieSet;
use crate::credential::Credential;
use crate::error::SurfaceError;

/// What the auth controller asks the surface to load.
#[derive(Debug, Clone)]
pub struct SurfaceRequest {
    /// URL to open; triggers the SSO redirect chain.
    pub entry_url: String,
    /// Script to inject on every navigation.
    pub injected_script: String,
}

/// Verdict posted by the injected script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMessage {
    /// The flow reached the goal URL; the session is established.
    Success,
    /// The login form re-rendered with an error banner; wrong credentials.
    Unauthorized,
}

/// An embedded browser the host application provides.
#[async_trait]
pub trait BrowsingSurface: Send + Sync {
    /// Loads `request.entry_url` with the script injected and resolves
    /// once the script posts a verdict.
    async fn drive(&self, request: SurfaceRequest) -> Result<SurfaceMessage, SurfaceError>;

    /// Collects every cookie visible for `url`, unioning the surface's
    /// cookie stores when it keeps more than one.
    async fn cookies_for(&self, url: &str) -> Result<CookieSet, SurfaceError>;

    /// Wipes the surface's cookie stores. Runs after every login attempt
    /// so a later attempt starts from a clean slate.
    async fn clear_cookies(&self) -> Result<(), SurfaceError>;
}

/// Builds the script injected into the SSO flow.
///
/// On the login form it reports `UNAUTHORIZED` when the error banner is
/// present, otherwise fills the form and submits. Once the location
/// reaches the goal URL it reports `SUCCESS`. Anywhere else it stays
/// silent and lets the redirect chain continue.
///
/// Surfaces must expose `window.unipalBridge.postMessage(text)` to the
/// page and surface the posted text as a [`SurfaceMessage`].
pub fn login_script(credential: &Credential, login_form_url: &str) -> String {
    format!(
        r#"(function() {{
  var href = window.location.href;
  if (href.indexOf('{goal_url}') === 0) {{
    window.unipalBridge.postMessage('SUCCESS');
    return;
  }}
  if (href.indexOf('{login_form_url}') === 0) {{
    if (document.querySelector('.c-message._error')) {{
      window.unipalBridge.postMessage('UNAUTHORIZED');
      return;
    }}
    document.getElementById('username').value = '{user_id}';
    document.getElementById('password').value = '{password}';
    document.getElementById('login').click();
  }}
}})();
true;"#,
        goal_url = credential.goal_url,
        login_form_url = login_form_url,
        user_id = credential.user_id,
        password = credential.password,
    )
}
