//! Core module - identity propagation and dispatch.
//!
//! This module contains the heart of Courier's outbound processing:
//! - Conversation propagation
//! - Correlation resolution
//! - The send context pipeline and its transport seam

pub mod conversation;
pub mod correlation;
pub mod ids;
pub mod pipeline;
pub mod transport;

pub use conversation::{ConversationIds, ConversationPropagator, Intent};
pub use correlation::CorrelationResolver;
pub use ids::{IdGenerator, NewIdGenerator};
pub use pipeline::{SendOptions, SendPipeline};
pub use transport::{InMemoryTransport, Transport};
