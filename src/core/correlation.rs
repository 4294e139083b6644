//! Business correlation of outbound messages.
//!
//! Correlation is independent of conversation identity: it is never read
//! from, nor written into, the conversation fields.

use uuid::Uuid;

use crate::protocol::Message;

/// Derives the correlation id of an outbound message.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationResolver;

impl CorrelationResolver {
    pub fn new() -> Self {
        Self
    }

    /// A caller-supplied id wins; otherwise the payload's correlating field
    /// is used, and payloads without one leave the id unset.
    pub fn resolve<M: Message>(&self, message: &M, requested: Option<Uuid>) -> Option<Uuid> {
        let resolved = requested.or_else(|| message.correlation_id());
        if let Some(id) = resolved {
            tracing::trace!(correlation_id = %id, message_type = %M::message_type(), "correlated");
        }
        resolved
    }
}
