//! Message protocol for Courier.
//!
//! This module defines what travels on the wire:
//! - Typed header store with well-known identity keys
//! - Immutable per-message identity context
//! - Envelopes wrapping headers and a serialized payload
//! - The payload contract, including its optional correlating field

pub mod context;
pub mod envelope;
pub mod headers;
pub mod message;

pub use context::{IdentitySummary, MessageContext};
pub use envelope::Envelope;
pub use headers::{keys, FromHeaderValue, HeaderValue, Headers};
pub use message::Message;
