//! Immutable per-message identity context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::headers::{keys, Headers};

/// Identity and addressing of a single message instance.
///
/// Every field is read from the message's headers through the typed
/// [`Headers`] accessors, so a header with an unusable value is reported
/// exactly like a missing one. A context is never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContext {
    message_id: Uuid,
    conversation_id: Option<Uuid>,
    initiating_conversation_id: Option<Uuid>,
    correlation_id: Option<Uuid>,
    request_id: Option<Uuid>,
    source_address: Option<String>,
    destination_address: Option<String>,
    response_address: Option<String>,
    sent_time: Option<DateTime<Utc>>,
    message_type: Option<String>,
    headers: Headers,
}

impl MessageContext {
    /// Read a context back from received headers.
    ///
    /// Returns `None` only when the message id itself is unreadable.
    pub fn from_headers(headers: Headers) -> Option<Self> {
        let message_id = headers.get(keys::MESSAGE_ID)?;
        Some(Self::from_parts(message_id, headers))
    }

    pub(crate) fn from_parts(message_id: Uuid, headers: Headers) -> Self {
        Self {
            message_id,
            conversation_id: headers.get(keys::CONVERSATION_ID),
            initiating_conversation_id: headers.get(keys::INITIATING_CONVERSATION_ID),
            correlation_id: headers.get(keys::CORRELATION_ID),
            request_id: headers.get(keys::REQUEST_ID),
            source_address: headers.get(keys::SOURCE_ADDRESS),
            destination_address: headers.get(keys::DESTINATION_ADDRESS),
            response_address: headers.get(keys::RESPONSE_ADDRESS),
            sent_time: headers.get(keys::SENT_TIME),
            message_type: headers.get(keys::MESSAGE_TYPE),
            headers,
        }
    }

    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    pub fn conversation_id(&self) -> Option<Uuid> {
        self.conversation_id
    }

    /// The conversation that was active when this message's conversation
    /// was deliberately started anew.
    pub fn initiating_conversation_id(&self) -> Option<Uuid> {
        self.initiating_conversation_id
    }

    pub fn correlation_id(&self) -> Option<Uuid> {
        self.correlation_id
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    pub fn source_address(&self) -> Option<&str> {
        self.source_address.as_deref()
    }

    pub fn destination_address(&self) -> Option<&str> {
        self.destination_address.as_deref()
    }

    pub fn response_address(&self) -> Option<&str> {
        self.response_address.as_deref()
    }

    /// Where a response to this message should go.
    pub fn reply_address(&self) -> Option<&str> {
        self.response_address().or_else(|| self.source_address())
    }

    pub fn sent_time(&self) -> Option<DateTime<Utc>> {
        self.sent_time
    }

    pub fn message_type(&self) -> Option<&str> {
        self.message_type.as_deref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Compact view of the identity fields, for logs and diagnostics.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            message_id: self.message_id,
            message_type: self.message_type.clone(),
            conversation_id: self.conversation_id,
            initiating_conversation_id: self.initiating_conversation_id,
            correlation_id: self.correlation_id,
            request_id: self.request_id,
        }
    }
}

/// Serializable snapshot of a context's identity fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentitySummary {
    pub message_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiating_conversation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_headers() {
        let message_id = Uuid::new_v4();
        let conversation_id = Uuid::new_v4();
        let mut headers = Headers::new();
        headers.set(keys::MESSAGE_ID, message_id);
        headers.set(keys::CONVERSATION_ID, conversation_id);
        headers.set(keys::SOURCE_ADDRESS, "queue:orders");

        let ctx = MessageContext::from_headers(headers).unwrap();

        assert_eq!(ctx.message_id(), message_id);
        assert_eq!(ctx.conversation_id(), Some(conversation_id));
        assert_eq!(ctx.initiating_conversation_id(), None);
        assert_eq!(ctx.correlation_id(), None);
        assert_eq!(ctx.reply_address(), Some("queue:orders"));
    }

    #[test]
    fn test_missing_message_id() {
        let mut headers = Headers::new();
        headers.set(keys::CONVERSATION_ID, Uuid::new_v4());

        assert!(MessageContext::from_headers(headers).is_none());
    }

    #[test]
    fn test_malformed_identity_header_reads_as_absent() {
        let mut headers = Headers::new();
        headers.set(keys::MESSAGE_ID, Uuid::new_v4());
        headers.set(keys::CONVERSATION_ID, true);
        headers.set(keys::INITIATING_CONVERSATION_ID, "garbage");

        let ctx = MessageContext::from_headers(headers).unwrap();

        assert_eq!(ctx.conversation_id(), None);
        assert_eq!(ctx.initiating_conversation_id(), None);
        assert!(ctx.headers().contains_key(keys::CONVERSATION_ID));
    }

    #[test]
    fn test_response_address_preferred_for_reply() {
        let mut headers = Headers::new();
        headers.set(keys::MESSAGE_ID, Uuid::new_v4());
        headers.set(keys::SOURCE_ADDRESS, "queue:orders");
        headers.set(keys::RESPONSE_ADDRESS, "queue:replies");

        let ctx = MessageContext::from_headers(headers).unwrap();
        assert_eq!(ctx.reply_address(), Some("queue:replies"));
    }

    #[test]
    fn test_summary_omits_absent_fields() {
        let mut headers = Headers::new();
        headers.set(keys::MESSAGE_ID, Uuid::nil());

        let ctx = MessageContext::from_headers(headers).unwrap();
        let json = serde_json::to_value(ctx.summary()).unwrap();

        assert!(json.get("message_id").is_some());
        assert!(json.get("initiating_conversation_id").is_none());
    }
}
