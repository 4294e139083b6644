//! Send context pipeline for send, publish and respond.
//!
//! Each outbound message goes through one pass:
//! 1. build a mutable draft
//! 2. apply caller options
//! 3. resolve conversation identity against the inbound context
//! 4. resolve the correlation id
//! 5. freeze the draft and hand it to the transport
//!
//! The inbound context is always passed in explicitly; `None` means root
//! dispatch.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use super::conversation::{ConversationIds, ConversationPropagator, Intent};
use super::correlation::CorrelationResolver;
use super::ids::{IdGenerator, NewIdGenerator};
use super::transport::Transport;
use crate::config::BusSettings;
use crate::error::{Error, Result};
use crate::protocol::headers::{keys, HeaderValue, Headers};
use crate::protocol::{Envelope, Message, MessageContext};

/// Caller configuration for a single outbound message.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    conversation_id: Option<Uuid>,
    start_new: Option<Option<Uuid>>,
    correlation_id: Option<Uuid>,
    request_id: Option<Uuid>,
    response_address: Option<String>,
    headers: Vec<(String, HeaderValue)>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use exactly this conversation id.
    pub fn conversation_id(mut self, id: Uuid) -> Self {
        self.conversation_id = Some(id);
        self
    }

    /// Start a new conversation with a freshly generated id.
    pub fn start_new_conversation(mut self) -> Self {
        self.start_new = Some(None);
        self
    }

    /// Start a new conversation with the given id.
    pub fn start_new_conversation_with(mut self, id: Uuid) -> Self {
        self.start_new = Some(Some(id));
        self
    }

    /// Override the payload's correlation id.
    pub fn correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    pub fn request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Where responses to this message should be sent.
    pub fn response_address(mut self, address: impl Into<String>) -> Self {
        self.response_address = Some(address.into());
        self
    }

    /// Attach an application header. Well-known identity keys are ignored.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// The conversation intent these options express.
    ///
    /// An explicit conversation id takes precedence over a start-new request.
    pub fn intent(&self) -> Intent {
        match (self.conversation_id, self.start_new) {
            (Some(id), Some(_)) => {
                tracing::warn!(
                    conversation_id = %id,
                    "both an explicit conversation id and a new conversation were requested, using the explicit id"
                );
                Intent::Explicit(id)
            }
            (Some(id), None) => Intent::Explicit(id),
            (None, Some(requested)) => Intent::StartNew(requested),
            (None, None) => Intent::Inherit,
        }
    }
}

/// Outbound context under construction. Owned by one pipeline pass.
#[derive(Debug)]
struct SendDraft {
    message_id: Uuid,
    message_type: String,
    source_address: String,
    destination_address: String,
    conversation: Option<ConversationIds>,
    correlation_id: Option<Uuid>,
    request_id: Option<Uuid>,
    response_address: Option<String>,
    headers: Headers,
}

impl SendDraft {
    fn new(message_id: Uuid, message_type: String, source: &str, destination: &str) -> Self {
        Self {
            message_id,
            message_type,
            source_address: source.to_string(),
            destination_address: destination.to_string(),
            conversation: None,
            correlation_id: None,
            request_id: None,
            response_address: None,
            headers: Headers::new(),
        }
    }

    /// Apply caller options and return the resulting intent.
    fn apply(&mut self, options: SendOptions) -> Intent {
        let intent = options.intent();

        for (key, value) in options.headers {
            if keys::is_reserved(&key) {
                tracing::debug!("Ignoring caller header {} reserved for identity", key);
                continue;
            }
            self.headers.set(key, value);
        }

        self.request_id = options.request_id;
        self.response_address = options.response_address;
        self.correlation_id = options.correlation_id;
        intent
    }

    fn freeze(self) -> MessageContext {
        let mut headers = self.headers;

        headers.set(keys::MESSAGE_ID, self.message_id);
        headers.set(keys::MESSAGE_TYPE, self.message_type);
        headers.set(keys::SOURCE_ADDRESS, self.source_address);
        headers.set(keys::DESTINATION_ADDRESS, self.destination_address);
        headers.set(keys::SENT_TIME, Utc::now());
        if let Some(ids) = self.conversation {
            headers.set(keys::CONVERSATION_ID, ids.conversation_id);
            headers.set_opt(keys::INITIATING_CONVERSATION_ID, ids.initiating_conversation_id);
        }
        headers.set_opt(keys::CORRELATION_ID, self.correlation_id);
        headers.set_opt(keys::REQUEST_ID, self.request_id);
        headers.set_opt(keys::RESPONSE_ADDRESS, self.response_address);

        MessageContext::from_parts(self.message_id, headers)
    }
}

/// Builds outbound contexts and dispatches them.
pub struct SendPipeline {
    settings: BusSettings,
    ids: Arc<dyn IdGenerator>,
    conversations: ConversationPropagator,
    correlations: CorrelationResolver,
    transport: Arc<dyn Transport>,
}

impl SendPipeline {
    pub fn new(settings: BusSettings, transport: Arc<dyn Transport>) -> Self {
        Self::with_id_generator(settings, transport, Arc::new(NewIdGenerator))
    }

    pub fn with_id_generator(
        settings: BusSettings,
        transport: Arc<dyn Transport>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            settings,
            conversations: ConversationPropagator::new(Arc::clone(&ids)),
            correlations: CorrelationResolver::new(),
            ids,
            transport,
        }
    }

    pub fn settings(&self) -> &BusSettings {
        &self.settings
    }

    /// Build the frozen outbound context without dispatching it.
    pub fn prepare<M: Message>(
        &self,
        inbound: Option<&MessageContext>,
        destination: &str,
        message: &M,
        options: SendOptions,
    ) -> MessageContext {
        let mut draft = SendDraft::new(
            self.ids.next_id(),
            M::message_type(),
            &self.settings.source_address,
            destination,
        );

        let intent = draft.apply(options);
        draft.conversation = Some(self.conversations.resolve(inbound, intent));
        draft.correlation_id = self.correlations.resolve(message, draft.correlation_id);

        draft.freeze()
    }

    /// Send a message to a specific address.
    pub async fn send<M: Message>(
        &self,
        inbound: Option<&MessageContext>,
        destination: &str,
        message: &M,
        options: SendOptions,
    ) -> Result<MessageContext> {
        let context = self.prepare(inbound, destination, message, options);
        self.dispatch(destination, context, message).await
    }

    /// Publish a message to its type's topic.
    pub async fn publish<M: Message>(
        &self,
        inbound: Option<&MessageContext>,
        message: &M,
        options: SendOptions,
    ) -> Result<MessageContext> {
        let destination = self.publish_address::<M>();
        self.send(inbound, &destination, message, options).await
    }

    /// Respond to the message being handled.
    ///
    /// Goes to the inbound response address, or its source address when no
    /// response address was given. The inbound request id is echoed unless
    /// the options set one.
    pub async fn respond<M: Message>(
        &self,
        inbound: &MessageContext,
        message: &M,
        options: SendOptions,
    ) -> Result<MessageContext> {
        let destination = inbound
            .reply_address()
            .ok_or_else(|| Error::NoResponseAddress(inbound.message_id().to_string()))?
            .to_string();

        let options = match (options.request_id, inbound.request_id()) {
            (None, Some(request_id)) => options.request_id(request_id),
            _ => options,
        };

        self.send(Some(inbound), &destination, message, options).await
    }

    /// Topic address messages of type `M` are published to.
    pub fn publish_address<M: Message>(&self) -> String {
        format!("{}{}", self.settings.publish_prefix, M::message_type())
    }

    async fn dispatch<M: Message>(
        &self,
        destination: &str,
        context: MessageContext,
        message: &M,
    ) -> Result<MessageContext> {
        let envelope = Envelope::new(&context, message)?;

        let span = tracing::debug_span!(
            "dispatch",
            message_id = %context.message_id(),
            conversation_id = ?context.conversation_id(),
            destination = %destination,
        );

        tracing::debug!(
            parent: &span,
            initiating_conversation_id = ?context.initiating_conversation_id(),
            correlation_id = ?context.correlation_id(),
            "Dispatching {}",
            envelope.message_type
        );

        self.transport
            .dispatch(destination, envelope)
            .instrument(span)
            .await?;
        Ok(context)
    }
}
