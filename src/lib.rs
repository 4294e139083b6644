//! Courier library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod protocol;

pub use cli::Commands;
pub use config::{load_settings, BusSettings, Settings};
pub use crate::core::{
    ConversationIds, ConversationPropagator, CorrelationResolver, IdGenerator, InMemoryTransport,
    Intent, NewIdGenerator, SendOptions, SendPipeline, Transport,
};
pub use error::{Error, Result};
pub use protocol::{Envelope, Headers, HeaderValue, Message, MessageContext};
