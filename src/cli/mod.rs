//! CLI commands for Courier using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{load_settings, load_settings_from, Settings};
use crate::core::{InMemoryTransport, SendOptions, SendPipeline};
use crate::protocol::{Envelope, Message};

const TRACE_INPUT: &str = "queue:trace-input";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TracePing {
    correlation_id: Uuid,
}

impl Message for TracePing {
    fn correlation_id(&self) -> Option<Uuid> {
        Some(self.correlation_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TracePong {
    correlation_id: Uuid,
}

impl Message for TracePong {
    fn correlation_id(&self) -> Option<Uuid> {
        Some(self.correlation_id)
    }
}

/// Courier - conversation identity tooling for the message bus.
#[derive(Parser)]
#[command(name = "courier")]
#[command(version = "0.1.0")]
#[command(about = "Courier - conversation and correlation identity for bus messages", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to ~/.courier/settings.json)
    #[arg(long, global = true, env = "COURIER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a send + respond chain on an in-memory bus and print identities
    Trace {
        /// Start a new conversation on the root send
        #[arg(long)]
        start_new: bool,

        /// Conversation id for the root send
        #[arg(long = "conversation-id")]
        conversation_id: Option<Uuid>,

        /// Start a new conversation when responding
        #[arg(long)]
        respond_start_new: bool,
    },

    /// Print the identity fields of an envelope JSON file
    Inspect {
        /// Envelope file
        file: PathBuf,
    },
}

impl Commands {
    /// Load settings from `--config` or the default location.
    pub fn settings(&self) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => load_settings_from(path)?,
            None => load_settings()?,
        };
        Ok(settings)
    }

    /// Run the command.
    pub async fn run(&self, settings: Settings) -> Result<()> {
        match &self.command {
            Command::Trace {
                start_new,
                conversation_id,
                respond_start_new,
            } => cmd_trace(settings, *start_new, *conversation_id, *respond_start_new).await,
            Command::Inspect { file } => cmd_inspect(file),
        }
    }
}

async fn cmd_trace(
    settings: Settings,
    start_new: bool,
    conversation_id: Option<Uuid>,
    respond_start_new: bool,
) -> Result<()> {
    let transport = Arc::new(InMemoryTransport::new());
    let bus = SendPipeline::new(settings.bus, transport.clone());

    let options = match (start_new, conversation_id) {
        (true, Some(id)) => SendOptions::new().start_new_conversation_with(id),
        (true, None) => SendOptions::new().start_new_conversation(),
        (false, Some(id)) => SendOptions::new().conversation_id(id),
        (false, None) => SendOptions::new(),
    };

    let ping = TracePing {
        correlation_id: Uuid::new_v4(),
    };
    bus.send(None, TRACE_INPUT, &ping, options).await?;

    let request = transport
        .receive(TRACE_INPUT)?
        .context("root message was not queued")?;
    let inbound = request.context()?;
    let received: TracePing = request.decode_body()?;

    let respond_options = if respond_start_new {
        SendOptions::new().start_new_conversation()
    } else {
        SendOptions::new()
    };
    let pong = TracePong {
        correlation_id: received.correlation_id,
    };
    let reply_to = inbound
        .reply_address()
        .map(str::to_string)
        .context("inbound message has no reply address")?;
    bus.respond(&inbound, &pong, respond_options).await?;

    let reply = transport
        .receive(&reply_to)?
        .context("response was not queued")?;
    let response = reply.context()?;

    let chain = vec![inbound.summary(), response.summary()];
    println!("{}", serde_json::to_string_pretty(&chain)?);
    Ok(())
}

fn cmd_inspect(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let envelope = Envelope::from_bytes(&bytes)?;
    let context = envelope.context()?;

    println!("{}", serde_json::to_string_pretty(&context.summary())?);
    Ok(())
}
