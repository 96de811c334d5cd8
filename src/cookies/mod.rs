//! Cookie adapter for frontstore.
//!
//! [`Cookies`] reads and writes one [`CookieJar`]. Names and values are
//! percent-encoded on write and decoded on read; expiry is the jar's job.

pub mod jar;
pub mod options;
pub mod parse;

pub use jar::{CookieJar, MemoryCookieJar, StoredCookie};
pub use options::{CookieDefaults, CookieExpiry, CookieOptions};

use options::EPOCH_EXPIRES;
use parse::{encode_component, parse_cookie_string};

/// Names that would be read as cookie attributes rather than a cookie.
pub const RESERVED_NAMES: &[&str] = &["expires", "max-age", "path", "domain", "secure"];

/// Check whether a key collides with a cookie attribute name.
pub fn is_reserved_name(key: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

/// Get/set/remove access to the cookies of one jar.
#[derive(Debug)]
pub struct Cookies<J> {
    jar: J,
    defaults: CookieDefaults,
}

impl<J: CookieJar> Cookies<J> {
    pub fn new(jar: J) -> Self {
        Self::with_defaults(jar, CookieDefaults::default())
    }

    /// Create an adapter whose writes fall back to `defaults` for path,
    /// domain and the secure flag.
    pub fn with_defaults(jar: J, defaults: CookieDefaults) -> Self {
        Self { jar, defaults }
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    pub fn defaults(&self) -> &CookieDefaults {
        &self.defaults
    }

    /// Decoded value of the first cookie named `key`.
    ///
    /// Returns `None` when `key` is empty, there is no such cookie, or its
    /// value is empty.
    pub fn get_item(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        parse_cookie_string(&self.jar.cookie_string())
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
    }

    /// Write a cookie.
    ///
    /// Returns `false` without writing when `key` is empty or an attribute
    /// name such as `path` or `Max-Age`.
    pub fn set_item(&self, key: &str, value: &str, options: &CookieOptions) -> bool {
        if key.is_empty() || is_reserved_name(key) {
            tracing::debug!(key, "rejecting cookie name");
            return false;
        }

        let mut assignment = format!("{}={}", encode_component(key), encode_component(value));
        if let Some(expires) = options.end.as_ref().and_then(|end| end.attribute()) {
            assignment.push_str(&expires);
        }
        self.push_scope(
            &mut assignment,
            options.path.as_deref(),
            options.domain.as_deref(),
        );
        if options.secure.unwrap_or(self.defaults.secure) {
            assignment.push_str("; secure");
        }

        tracing::debug!(key, "writing cookie");
        self.jar.write(&assignment);
        true
    }

    /// Expire the cookie named `key` at `path`/`domain`.
    ///
    /// Returns `false` when `key` is empty or no such cookie is present.
    /// Path and domain fall back to the adapter defaults so a cookie written
    /// with defaults is removed with defaults.
    pub fn remove_item(&self, key: &str, path: Option<&str>, domain: Option<&str>) -> bool {
        if key.is_empty() || !self.has_item(key) {
            return false;
        }

        let mut assignment = format!("{}=; expires={}", encode_component(key), EPOCH_EXPIRES);
        self.push_scope(&mut assignment, path, domain);

        tracing::debug!(key, "removing cookie");
        self.jar.write(&assignment);
        true
    }

    /// Whether a cookie named `key` is present, whatever its value.
    pub fn has_item(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        parse_cookie_string(&self.jar.cookie_string())
            .iter()
            .any(|(name, _)| name == key)
    }

    /// Decoded cookie names in cookie-string order. Nameless cookies are skipped.
    pub fn keys(&self) -> Vec<String> {
        parse_cookie_string(&self.jar.cookie_string())
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Decoded `(name, value)` pairs in cookie-string order.
    pub fn entries(&self) -> Vec<(String, String)> {
        parse_cookie_string(&self.jar.cookie_string())
    }

    // domain before path, matching the attribute order browsers echo back
    fn push_scope(&self, assignment: &mut String, path: Option<&str>, domain: Option<&str>) {
        if let Some(domain) = domain.or(self.defaults.domain.as_deref()) {
            if !domain.is_empty() {
                assignment.push_str("; domain=");
                assignment.push_str(domain);
            }
        }
        if let Some(path) = path.or(self.defaults.path.as_deref()) {
            if !path.is_empty() {
                assignment.push_str("; path=");
                assignment.push_str(path);
            }
        }
    }
}
