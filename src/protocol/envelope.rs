//! Wire envelopes: headers plus a serialized payload.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::context::MessageContext;
use super::headers::{keys, Headers};
use super::message::Message;
use crate::error::{Error, Result};

/// Message envelope as it travels through a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Identity, addressing and caller metadata
    pub headers: Headers,
    /// Payload type name
    pub message_type: String,
    /// The message payload
    pub body: serde_json::Value,
}

impl Envelope {
    /// Wrap a frozen context and its payload.
    pub fn new<M: Message>(context: &MessageContext, message: &M) -> Result<Self> {
        Ok(Self {
            headers: context.headers().clone(),
            message_type: M::message_type(),
            body: serde_json::to_value(message)?,
        })
    }

    /// Read the identity context from the envelope headers.
    pub fn context(&self) -> Result<MessageContext> {
        MessageContext::from_headers(self.headers.clone())
            .ok_or_else(|| Error::NotFound(format!("{} header", keys::MESSAGE_ID)))
    }

    /// Deserialize the payload.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
