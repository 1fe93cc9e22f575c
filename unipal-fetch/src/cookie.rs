//! Session cookies and the rotten-aware jar.
//!
//! Portal sessions go stale well before the cookies formally expire, so the
//! jar tracks when it was last refreshed and reports itself stale after a
//! configurable age. A freshly constructed (or cleared) jar reports the
//! Unix epoch as its refresh time, which makes "empty" and "stale"
//! coincide by construction.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

/// A named set of cookies, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: BTreeMap<String, String>,
}

impl CookieSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a cookie.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// True when the set holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Number of cookies held.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Merges `other` into `self`; on a name collision `other` wins.
    pub fn union(mut self, other: CookieSet) -> CookieSet {
        self.cookies.extend(other.cookies);
        self
    }

    /// Renders the `Cookie` header value. The upstream services expect a
    /// leading separator before the first pair, so the result starts with
    /// `"; "`.
    pub fn to_header_value(&self) -> String {
        let joined = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        format!("; {joined}")
    }
}

impl FromIterator<(String, String)> for CookieSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            cookies: iter.into_iter().collect(),
        }
    }
}

/// Cookie jar for one portal session.
#[derive(Debug, Clone)]
pub struct SessionCookieJar {
    cookies: CookieSet,
    last_refreshed_at: DateTime<Utc>,
}

impl SessionCookieJar {
    /// Creates an empty jar. Its refresh time is the epoch, so it is
    /// stale for any reasonable rotten duration.
    pub fn new() -> Self {
        Self {
            cookies: CookieSet::new(),
            last_refreshed_at: DateTime::UNIX_EPOCH,
        }
    }

    /// The cookies currently held.
    pub fn cookies(&self) -> &CookieSet {
        &self.cookies
    }

    /// True when the jar was last refreshed at least `rotten` ago.
    pub fn is_stale(&self, rotten: Duration) -> bool {
        Utc::now() - self.last_refreshed_at >= rotten
    }

    /// Replaces the jar contents and marks the jar fresh.
    pub fn store(&mut self, cookies: CookieSet) {
        self.cookies = cookies;
        self.last_refreshed_at = Utc::now();
    }

    /// Empties the jar and resets the refresh time to the epoch.
    pub fn clear(&mut self) {
        self.cookies = CookieSet::new();
        self.last_refreshed_at = DateTime::UNIX_EPOCH;
    }
}

impl Default for SessionCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_has_leading_separator() {
        let mut set = CookieSet::new();
        set.insert("JSESSIONID", "abc123");
        set.insert("_shibsession", "xyz");
        assert_eq!(set.to_header_value(), "; JSESSIONID=abc123; _shibsession=xyz");
    }

    #[test]
    fn test_union_prefers_other_on_collision() {
        let mut a = CookieSet::new();
        a.insert("sid", "old");
        a.insert("only_a", "1");
        let mut b = CookieSet::new();
        b.insert("sid", "new");
        let merged = a.union(b);
        assert_eq!(merged.len(), 2);
        assert!(merged.to_header_value().contains("sid=new"));
    }

    #[test]
    fn test_new_jar_is_stale_and_empty() {
        let jar = SessionCookieJar::new();
        assert!(jar.cookies().is_empty());
        assert!(jar.is_stale(Duration::minutes(25)));
    }

    #[test]
    fn test_stored_jar_is_fresh_then_cleared_is_stale() {
        let mut jar = SessionCookieJar::new();
        let mut set = CookieSet::new();
        set.insert("sid", "v");
        jar.store(set);
        assert!(!jar.is_stale(Duration::minutes(25)));
        jar.clear();
        assert!(jar.cookies().is_empty());
        assert!(jar.is_stale(Duration::minutes(25)));
    }
}
