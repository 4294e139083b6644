//! Typed, read-only header access over a message envelope's metadata.
//!
//! Lookups never fail loudly: a key that is missing and a key whose value
//! cannot be converted to the requested type both read as `None`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known header keys written on every outbound envelope.
pub mod keys {
    pub const MESSAGE_ID: &str = "MessageId";
    pub const CONVERSATION_ID: &str = "ConversationId";
    /// Only present on a message that started a new conversation while
    /// another message was being handled.
    pub const INITIATING_CONVERSATION_ID: &str = "InitiatingConversationId";
    pub const CORRELATION_ID: &str = "CorrelationId";
    pub const REQUEST_ID: &str = "RequestId";
    pub const SOURCE_ADDRESS: &str = "SourceAddress";
    pub const DESTINATION_ADDRESS: &str = "DestinationAddress";
    pub const RESPONSE_ADDRESS: &str = "ResponseAddress";
    pub const SENT_TIME: &str = "SentTime";
    pub const MESSAGE_TYPE: &str = "MessageType";

    /// Keys owned by the send pipeline. Caller-supplied headers never
    /// overwrite these.
    pub const RESERVED: [&str; 10] = [
        MESSAGE_ID,
        CONVERSATION_ID,
        INITIATING_CONVERSATION_ID,
        CORRELATION_ID,
        REQUEST_ID,
        SOURCE_ADDRESS,
        DESTINATION_ADDRESS,
        RESPONSE_ADDRESS,
        SENT_TIME,
        MESSAGE_TYPE,
    ];

    pub fn is_reserved(key: &str) -> bool {
        RESERVED.contains(&key)
    }
}

/// A single header value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderValue {
    String(String),
    Uuid(Uuid),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Uuid> for HeaderValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for HeaderValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Conversion out of a stored header value.
///
/// Returns `None` when the value has an incompatible shape. Textual values
/// are parsed where the target type has a canonical string form.
pub trait FromHeaderValue: Sized {
    fn from_header_value(value: &HeaderValue) -> Option<Self>;
}

impl FromHeaderValue for String {
    fn from_header_value(value: &HeaderValue) -> Option<Self> {
        match value {
            HeaderValue::String(s) => Some(s.clone()),
            HeaderValue::Uuid(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

impl FromHeaderValue for Uuid {
    fn from_header_value(value: &HeaderValue) -> Option<Self> {
        match value {
            HeaderValue::Uuid(id) => Some(*id),
            HeaderValue::String(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

impl FromHeaderValue for i64 {
    fn from_header_value(value: &HeaderValue) -> Option<Self> {
        match value {
            HeaderValue::Int(n) => Some(*n),
            HeaderValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromHeaderValue for bool {
    fn from_header_value(value: &HeaderValue) -> Option<Self> {
        match value {
            HeaderValue::Bool(b) => Some(*b),
            HeaderValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromHeaderValue for DateTime<Utc> {
    fn from_header_value(value: &HeaderValue) -> Option<Self> {
        match value {
            HeaderValue::Timestamp(ts) => Some(*ts),
            HeaderValue::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            _ => None,
        }
    }
}

/// String-keyed header map attached to an envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    values: HashMap<String, HeaderValue>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed lookup. Absent and type-mismatched headers both yield `None`.
    pub fn get<T: FromHeaderValue>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(T::from_header_value)
    }

    /// Raw lookup without conversion.
    pub fn get_value(&self, key: &str) -> Option<&HeaderValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: impl Into<HeaderValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Sets the header when `value` is present; otherwise leaves the key unset.
    pub(crate) fn set_opt<V: Into<HeaderValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }
}

impl FromIterator<(String, HeaderValue)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, HeaderValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_mismatched_read_the_same() {
        let mut headers = Headers::new();
        headers.set(keys::CONVERSATION_ID, 42i64);

        let missing: Option<Uuid> = headers.get(keys::INITIATING_CONVERSATION_ID);
        let mismatched: Option<Uuid> = headers.get(keys::CONVERSATION_ID);

        assert_eq!(missing, None);
        assert_eq!(mismatched, None);
        assert!(headers.contains_key(keys::CONVERSATION_ID));
    }

    #[test]
    fn test_uuid_from_string_header() {
        let id = Uuid::new_v4();
        let mut headers = Headers::new();
        headers.set(keys::CORRELATION_ID, id.to_string());
        headers.set("Bad", "not-a-uuid");

        assert_eq!(headers.get::<Uuid>(keys::CORRELATION_ID), Some(id));
        assert_eq!(headers.get::<Uuid>("Bad"), None);
    }

    #[test]
    fn test_scalar_conversions() {
        let now = Utc::now();
        let mut headers = Headers::new();
        headers.set("Retries", 3i64);
        headers.set("RetriesText", "7");
        headers.set("Durable", true);
        headers.set(keys::SENT_TIME, now);

        assert_eq!(headers.get::<i64>("Retries"), Some(3));
        assert_eq!(headers.get::<i64>("RetriesText"), Some(7));
        assert_eq!(headers.get::<bool>("Durable"), Some(true));
        assert_eq!(headers.get::<bool>("Retries"), None);
        assert_eq!(headers.get::<DateTime<Utc>>(keys::SENT_TIME), Some(now));
        assert_eq!(headers.get::<String>("Retries"), None);
    }

    #[test]
    fn test_set_opt_skips_none() {
        let mut headers = Headers::new();
        headers.set_opt::<Uuid>(keys::INITIATING_CONVERSATION_ID, None);
        headers.set_opt(keys::REQUEST_ID, Some(Uuid::nil()));

        assert!(!headers.contains_key(keys::INITIATING_CONVERSATION_ID));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_reserved_keys() {
        assert!(keys::is_reserved(keys::CONVERSATION_ID));
        assert!(keys::is_reserved(keys::INITIATING_CONVERSATION_ID));
        assert!(!keys::is_reserved("TenantId"));
    }

    #[test]
    fn test_tagged_json_keeps_value_kind() {
        let id = Uuid::new_v4();
        let mut headers = Headers::new();
        headers.set(keys::CONVERSATION_ID, id);
        headers.set("Note", id.to_string());

        let json = serde_json::to_string(&headers).unwrap();
        let back: Headers = serde_json::from_str(&json).unwrap();

        assert_eq!(back.get_value(keys::CONVERSATION_ID), Some(&HeaderValue::Uuid(id)));
        assert_eq!(back.get_value("Note"), Some(&HeaderValue::String(id.to_string())));
    }
}
