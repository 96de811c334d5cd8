//! The TTL envelope written into host stores.
//!
//! Wire format, one JSON object per key:
//!
//! ```text
//! {"value":"dark","__expire__":"permanently"}
//! {"value":{"id":7},"__expire__":1767225600000}
//! ```
//!
//! `__expire__` is either milliseconds since the Unix epoch or the literal
//! string `"permanently"`. A stored string that does not contain the marker
//! is not an envelope at all.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Result;

/// Field name that marks a stored string as an envelope.
pub const EXPIRY_MARKER: &str = "__expire__";

/// Sentinel stored for entries that never expire.
pub const PERMANENT: &str = "permanently";

/// A caller value: plain text or a string-keyed mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Text(String),
    Map(Map<String, Value>),
}

impl StoredValue {
    /// The text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) => None,
        }
    }

    /// The mapping, if this is a mapping value.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for StoredValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Map<String, Value>> for StoredValue {
    fn from(map: Map<String, Value>) -> Self {
        Self::Map(map)
    }
}

/// When an envelope stops being readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Absolute deadline in milliseconds since the Unix epoch.
    At(i64),
    /// Never expires.
    Permanently,
}

impl Expiry {
    /// Deadline `ttl` after `now`, or permanent when there is no ttl.
    ///
    /// A deadline past the representable range saturates at the range bound.
    pub fn from_ttl(ttl: Option<Duration>, now: DateTime<Utc>) -> Self {
        let Some(ttl) = ttl else {
            return Self::Permanently;
        };
        let deadline = now.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });
        Self::At(deadline.timestamp_millis())
    }

    /// Whether the deadline lies strictly before `now`.
    ///
    /// An entry is still readable at the exact millisecond of its deadline.
    pub fn is_elapsed_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::At(deadline) => *deadline < now.timestamp_millis(),
            Self::Permanently => false,
        }
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::At(millis) => serializer.serialize_i64(*millis),
            Self::Permanently => serializer.serialize_str(PERMANENT),
        }
    }
}

struct ExpiryVisitor;

impl<'de> Visitor<'de> for ExpiryVisitor {
    type Value = Expiry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an epoch timestamp in milliseconds or \"{}\"", PERMANENT)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Expiry, E> {
        Ok(Expiry::At(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Expiry, E> {
        i64::try_from(v)
            .map(Expiry::At)
            .map_err(|_| E::custom(format!("expiry {} out of range", v)))
    }

    // Writers that computed the deadline in floating point.
    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Expiry, E> {
        if v.is_finite() {
            Ok(Expiry::At(v as i64))
        } else {
            Err(E::custom("expiry is not a finite number"))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Expiry, E> {
        if v == PERMANENT {
            Ok(Expiry::Permanently)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ExpiryVisitor)
    }
}

/// A value together with its expiry, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub value: StoredValue,
    #[serde(rename = "__expire__")]
    pub expire: Expiry,
}

impl Envelope {
    pub fn new(value: StoredValue, expire: Expiry) -> Self {
        Self { value, expire }
    }

    /// Whether a raw stored string claims to be an envelope.
    pub fn is_envelope(raw: &str) -> bool {
        raw.contains(EXPIRY_MARKER)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
