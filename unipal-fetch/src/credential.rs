//! SSO credential bundle.

use std::fmt;

/// Everything the auth controller needs to drive one SSO login.
#[derive(Clone)]
pub struct Credential {
    /// Service entry URL that triggers the SSO redirect.
    pub entry_url: String,
    /// URL the flow lands on after a successful login; cookies are
    /// collected for this origin.
    pub goal_url: String,
    /// Student ID.
    pub user_id: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("entry_url", &self.entry_url)
            .field("goal_url", &self.goal_url)
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let c = Credential {
            entry_url: "https://example.test/enter".into(),
            goal_url: "https://example.test/home".into(),
            user_id: "t123456".into(),
            password: "hunter2".into(),
        };
        let dump = format!("{c:?}");
        assert!(dump.contains("t123456"));
        assert!(!dump.contains("hunter2"));
        assert!(dump.contains("<redacted>"));
    }
}
