//! Conversation identity propagation.
//!
//! Decides the conversation id and initiating conversation id of an outbound
//! message from the caller's intent and the context of the message currently
//! being handled, if any:
//! - `Explicit(id)` always wins and never records an initiating id
//! - root dispatch starts a conversation (caller id or a fresh one)
//! - `Inherit` inside a handler keeps the inbound conversation
//! - `StartNew` inside a handler opens a new conversation and records the
//!   inbound one as its initiator

use std::sync::Arc;

use uuid::Uuid;

use super::ids::{IdGenerator, NewIdGenerator};
use crate::protocol::MessageContext;

/// What the caller wants for the outbound message's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    /// Continue the inbound conversation, or start one at the root.
    #[default]
    Inherit,
    /// Deliberately start a new conversation, optionally with a chosen id.
    StartNew(Option<Uuid>),
    /// Use exactly this conversation id.
    Explicit(Uuid),
}

/// Resolved conversation identity of an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationIds {
    pub conversation_id: Uuid,
    pub initiating_conversation_id: Option<Uuid>,
}

impl ConversationIds {
    fn new(conversation_id: Uuid) -> Self {
        Self {
            conversation_id,
            initiating_conversation_id: None,
        }
    }
}

/// Computes conversation identity for outbound messages.
///
/// Resolution is total and pure apart from drawing fresh ids from the
/// generator.
#[derive(Clone)]
pub struct ConversationPropagator {
    ids: Arc<dyn IdGenerator>,
}

impl ConversationPropagator {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn resolve(&self, inbound: Option<&MessageContext>, intent: Intent) -> ConversationIds {
        if let Intent::Explicit(id) = intent {
            tracing::trace!(conversation_id = %id, "explicit conversation id");
            return ConversationIds::new(id);
        }

        // An inbound message without a readable conversation id is handled
        // as a root dispatch.
        let inbound_conversation = inbound.and_then(MessageContext::conversation_id);
        if inbound.is_some() && inbound_conversation.is_none() {
            tracing::debug!("inbound context has no conversation id, resolving as root dispatch");
        }

        match (inbound_conversation, intent) {
            (None, Intent::StartNew(Some(id))) => {
                tracing::trace!(conversation_id = %id, "root dispatch with caller conversation id");
                ConversationIds::new(id)
            }
            (None, _) => {
                let id = self.ids.next_id();
                tracing::trace!(conversation_id = %id, "root dispatch, new conversation");
                ConversationIds::new(id)
            }
            (Some(current), Intent::StartNew(requested)) => {
                let id = requested.unwrap_or_else(|| self.ids.next_id());
                tracing::trace!(
                    conversation_id = %id,
                    initiating_conversation_id = %current,
                    "new conversation started from handler"
                );
                ConversationIds {
                    conversation_id: id,
                    initiating_conversation_id: Some(current),
                }
            }
            (Some(current), _) => {
                tracing::trace!(conversation_id = %current, "inherited conversation");
                ConversationIds::new(current)
            }
        }
    }
}

impl Default for ConversationPropagator {
    fn default() -> Self {
        Self::new(Arc::new(NewIdGenerator))
    }
}

impl std::fmt::Debug for ConversationPropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationPropagator").finish_non_exhaustive()
    }
}
