//! Cookie write options.

use chrono::{DateTime, Utc};

/// HTTP-date written for cookies that should never expire.
pub const FAR_FUTURE_EXPIRES: &str = "Fri, 31 Dec 9999 23:59:59 GMT";

/// HTTP-date written to delete a cookie.
pub const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Format a timestamp as an HTTP-date, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// How long a cookie lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieExpiry {
    /// Relative lifetime in seconds, written as `max-age`.
    MaxAge(i64),
    /// Caller-formatted date, written as `expires` verbatim.
    Literal(String),
    /// Absolute instant, written as an `expires` HTTP-date.
    At(DateTime<Utc>),
    /// Effectively never: `expires` at the end of year 9999.
    Infinite,
}

impl CookieExpiry {
    /// The `; attribute=...` suffix for this expiry.
    ///
    /// A zero `MaxAge` or an empty `Literal` writes nothing, leaving a
    /// session cookie.
    pub fn attribute(&self) -> Option<String> {
        match self {
            Self::MaxAge(0) => None,
            Self::MaxAge(seconds) => Some(format!("; max-age={}", seconds)),
            Self::Literal(date) if date.is_empty() => None,
            Self::Literal(date) => Some(format!("; expires={}", date)),
            Self::At(at) => Some(format!("; expires={}", http_date(*at))),
            Self::Infinite => Some(format!("; expires={}", FAR_FUTURE_EXPIRES)),
        }
    }
}

/// Per-call options for [`Cookies::set_item`](super::Cookies::set_item).
///
/// Unset fields fall back to the adapter's [`CookieDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub end: Option<CookieExpiry>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: Option<bool>,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end(mut self, end: CookieExpiry) -> Self {
        self.end = Some(end);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }
}

/// Attributes applied to every write unless the call overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieDefaults {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
}
