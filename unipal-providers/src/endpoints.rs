//! Upstream service endpoints.
//!
//! `Default` carries the production values; tests and alternative
//! deployments construct their own.

use chrono::Duration;

/// Endpoints of one SSO-protected service.
#[derive(Debug, Clone)]
pub struct PortalEndpoints {
    /// Service origin, no trailing slash.
    pub base_url: String,
    /// Path that triggers the SSO redirect chain.
    pub auth_enter_path: String,
    /// Path the flow lands on after a successful login.
    pub auth_goal_path: String,
}

impl PortalEndpoints {
    /// Joins a path onto the service origin.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL that starts the SSO flow.
    pub fn entry_url(&self) -> String {
        self.url(&self.auth_enter_path)
    }

    /// Absolute URL the flow lands on; cookies are harvested for it.
    pub fn goal_url(&self) -> String {
        self.url(&self.auth_goal_path)
    }
}

/// All upstream endpoints plus session tuning.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    /// LMS.
    pub manabo: PortalEndpoints,
    /// Registration system.
    pub cubics: PortalEndpoints,
    /// Portal.
    pub albo: PortalEndpoints,
    /// Identity provider's login form URL; the injected script keys its
    /// form-filling branch off this prefix.
    pub login_form_url: String,
    /// Companion backend origin.
    pub hub_api_base_url: String,
    /// Age at which a session jar is considered rotten and re-auth runs.
    pub rotten_period: Duration,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            manabo: PortalEndpoints {
                base_url: "https://manabo.cnc.chukyo-u.ac.jp".into(),
                auth_enter_path: "/auth/shibboleth/".into(),
                auth_goal_path: "/auth/shibboleth/".into(),
            },
            cubics: PortalEndpoints {
                base_url: "https://cubics-as-out.mng.chukyo-u.ac.jp".into(),
                auth_enter_path: "/unias/UnSSOLoginControl2".into(),
                auth_goal_path: "/unias/UnSSOLoginControl2".into(),
            },
            albo: PortalEndpoints {
                base_url: "https://albo.chukyo-u.ac.jp".into(),
                auth_enter_path: "/api/saml/login".into(),
                auth_goal_path: "/dashboard".into(),
            },
            login_form_url:
                "https://shib.chukyo-u.ac.jp/cloudlink/module.php/core/loginuserpass.php".into(),
            hub_api_base_url: "https://api.unipal.app".into(),
            rotten_period: Duration::minutes(25),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_and_goal_urls() {
        let endpoints = ServiceEndpoints::default();
        assert_eq!(
            endpoints.albo.entry_url(),
            "https://albo.chukyo-u.ac.jp/api/saml/login"
        );
        assert_eq!(
            endpoints.albo.goal_url(),
            "https://albo.chukyo-u.ac.jp/dashboard"
        );
        assert_eq!(endpoints.manabo.entry_url(), endpoints.manabo.goal_url());
    }
}
