//! Host cookie jar contract.
//!
//! A jar exposes one cookie string for reading and accepts one
//! `name=value[; attribute...]` assignment per write, merging it into the
//! cookies it already holds, the way a document's cookie property does.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use super::parse::split_pair;

/// Trait for host cookie jars.
pub trait CookieJar: Send + Sync {
    /// All live cookies as `name=value` pairs joined by `; `.
    fn cookie_string(&self) -> String;

    /// Merge one cookie assignment into the jar.
    fn write(&self, assignment: &str);
}

impl<T: CookieJar + ?Sized> CookieJar for Arc<T> {
    fn cookie_string(&self) -> String {
        (**self).cookie_string()
    }

    fn write(&self, assignment: &str) {
        (**self).write(assignment)
    }
}

/// One cookie held by a [`MemoryCookieJar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    /// `None` for a session cookie.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    /// Parse an assignment as of `now`.
    ///
    /// `max-age` wins over `expires`. An `expires` date that does not parse
    /// is ignored, leaving a session cookie. Unknown attributes are ignored.
    pub fn parse(assignment: &str, now: DateTime<Utc>) -> Self {
        let mut segments = assignment.split(';');
        let (name, value) = split_pair(segments.next().unwrap_or_default());

        let mut cookie = Self {
            name: name.to_string(),
            value: value.to_string(),
            path: None,
            domain: None,
            secure: false,
            expires_at: None,
        };
        let mut max_age = None;

        for segment in segments {
            let (attr, attr_value) = match segment.split_once('=') {
                Some((attr, attr_value)) => (attr.trim(), attr_value.trim()),
                None => (segment.trim(), ""),
            };

            if attr.eq_ignore_ascii_case("expires") {
                match DateTime::parse_from_rfc2822(attr_value) {
                    Ok(at) => cookie.expires_at = Some(at.with_timezone(&Utc)),
                    Err(err) => {
                        tracing::debug!(cookie = %cookie.name, value = attr_value, error = %err, "ignoring unparseable expires");
                    }
                }
            } else if attr.eq_ignore_ascii_case("max-age") {
                if let Ok(seconds) = attr_value.parse::<i64>() {
                    max_age = Some(seconds);
                }
            } else if attr.eq_ignore_ascii_case("path") {
                cookie.path = Some(attr_value.to_string());
            } else if attr.eq_ignore_ascii_case("domain") {
                cookie.domain = Some(attr_value.to_string());
            } else if attr.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            }
        }

        if let Some(seconds) = max_age {
            cookie.expires_at = Some(if seconds <= 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                Duration::try_seconds(seconds)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            });
        }

        cookie
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Cookies are identified by name, path and domain.
    fn same_identity(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }
}

/// In-memory cookie jar.
///
/// Cookies keep the position of their first write. Expired cookies are left
/// out of the cookie string and dropped on the next write.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RwLock<Vec<StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self {
            cookies: RwLock::new(Vec::new()),
        }
    }

    /// Build a jar holding session cookies parsed from a cookie string.
    pub fn from_cookie_string(cookie_string: &str) -> Self {
        let jar = Self::new();
        for segment in cookie_string.split(';').map(str::trim) {
            if !segment.is_empty() {
                jar.write(segment);
            }
        }
        jar
    }

    /// Snapshot of the cookies currently held, expired ones included.
    pub fn cookies(&self) -> Vec<StoredCookie> {
        self.cookies.read().unwrap().clone()
    }

    /// Merge an assignment as of `now`.
    pub fn write_at(&self, assignment: &str, now: DateTime<Utc>) {
        let incoming = StoredCookie::parse(assignment, now);
        let mut cookies = self.cookies.write().unwrap();

        cookies.retain(|cookie| !cookie.is_expired_at(now));

        if incoming.is_expired_at(now) {
            cookies.retain(|cookie| !cookie.same_identity(&incoming));
            return;
        }

        match cookies.iter_mut().find(|cookie| cookie.same_identity(&incoming)) {
            Some(existing) => *existing = incoming,
            None => cookies.push(incoming),
        }
    }

    /// The cookie string as of `now`.
    pub fn cookie_string_at(&self, now: DateTime<Utc>) -> String {
        self.cookies
            .read()
            .unwrap()
            .iter()
            .filter(|cookie| !cookie.is_expired_at(now))
            .map(|cookie| {
                if cookie.name.is_empty() {
                    cookie.value.clone()
                } else {
                    format!("{}={}", cookie.name, cookie.value)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_string(&self) -> String {
        self.cookie_string_at(Utc::now())
    }

    fn write(&self, assignment: &str) {
        self.write_at(assignment, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_assignment_attributes() {
        let cookie = StoredCookie::parse(
            "sid=abc; expires=Fri, 31 Dec 9999 23:59:59 GMT; domain=example.com; path=/app; secure",
            now(),
        );
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.value, "abc");
        assert_eq!(cookie.path.as_deref(), Some("/app"));
        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert!(cookie.secure);
        assert_eq!(
            cookie.expires_at,
            Some(Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_max_age_wins_over_expires() {
        let cookie = StoredCookie::parse(
            "a=1; max-age=60; expires=Thu, 01 Jan 1970 00:00:00 GMT",
            now(),
        );
        assert_eq!(cookie.expires_at, Some(now() + Duration::seconds(60)));
    }

    #[test]
    fn test_huge_max_age_saturates() {
        let cookie = StoredCookie::parse(&format!("a=1; max-age={}", i64::MAX), now());
        assert_eq!(cookie.expires_at, Some(DateTime::<Utc>::MAX_UTC));
        assert!(!cookie.is_expired_at(now()));
    }

    #[test]
    fn test_unparseable_expires_is_session_cookie() {
        let cookie = StoredCookie::parse("a=1; expires=someday", now());
        assert!(cookie.expires_at.is_none());
    }

    #[test]
    fn test_write_appends_and_replaces_in_place() {
        let jar = MemoryCookieJar::new();
        jar.write_at("a=1", now());
        jar.write_at("b=2", now());
        jar.write_at("a=3", now());

        assert_eq!(jar.cookie_string_at(now()), "a=3; b=2");
    }

    #[test]
    fn test_same_name_different_path_coexist() {
        let jar = MemoryCookieJar::new();
        jar.write_at("a=1; path=/", now());
        jar.write_at("a=2; path=/app", now());

        assert_eq!(jar.cookie_string_at(now()), "a=1; a=2");
    }

    #[test]
    fn test_past_expiry_deletes_matching_cookie_only() {
        let jar = MemoryCookieJar::new();
        jar.write_at("a=1; path=/", now());
        jar.write_at("a=2; path=/app", now());

        jar.write_at("a=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/app", now());

        assert_eq!(jar.cookie_string_at(now()), "a=1");
    }

    #[test]
    fn test_zero_max_age_deletes() {
        let jar = MemoryCookieJar::new();
        jar.write_at("a=1", now());
        jar.write_at("a=1; max-age=0", now());

        assert_eq!(jar.cookie_string_at(now()), "");
    }

    #[test]
    fn test_expired_cookies_hidden_from_cookie_string() {
        let jar = MemoryCookieJar::new();
        jar.write_at("short=1; max-age=10", now());
        jar.write_at("long=2", now());

        assert_eq!(jar.cookie_string_at(now()), "short=1; long=2");
        assert_eq!(
            jar.cookie_string_at(now() + Duration::seconds(11)),
            "long=2"
        );
    }

    #[test]
    fn test_from_cookie_string() {
        let jar = MemoryCookieJar::from_cookie_string("a=1; b=2");
        assert_eq!(jar.cookie_string(), "a=1; b=2");
        assert_eq!(jar.cookies().len(), 2);
    }
}
