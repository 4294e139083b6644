//! Transport collaborator and an in-memory implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::protocol::Envelope;

/// Hands a finished envelope to the underlying broker.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn dispatch(&self, address: &str, envelope: Envelope) -> Result<()>;
}

/// In-process transport keeping serialized envelopes in per-address queues.
///
/// Envelopes are stored as JSON bytes so everything read back has gone
/// through the same encode/decode path as a real broker.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    queues: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest envelope queued for `address`.
    pub fn receive(&self, address: &str) -> Result<Option<Envelope>> {
        let bytes = {
            let mut queues = self.lock()?;
            queues.get_mut(address).and_then(VecDeque::pop_front)
        };

        bytes.map(|b| Envelope::from_bytes(&b)).transpose()
    }

    /// Number of envelopes waiting at `address`.
    pub fn pending(&self, address: &str) -> Result<usize> {
        Ok(self.lock()?.get(address).map_or(0, VecDeque::len))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, VecDeque<Vec<u8>>>>> {
        self.queues
            .lock()
            .map_err(|_| Error::Transport("in-memory queue lock poisoned".to_string()))
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn dispatch(&self, address: &str, envelope: Envelope) -> Result<()> {
        let bytes = envelope.to_bytes()?;
        self.lock()?
            .entry(address.to_string())
            .or_default()
            .push_back(bytes);
        tracing::debug!("Queued message to {}", address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::headers::{keys, Headers};
    use uuid::Uuid;

    fn envelope() -> Envelope {
        let mut headers = Headers::new();
        headers.set(keys::MESSAGE_ID, Uuid::new_v4());
        Envelope {
            headers,
            message_type: "Heartbeat".to_string(),
            body: serde_json::json!({ "sequence": 1 }),
        }
    }

    #[tokio::test]
    async fn test_fifo_per_address() {
        let transport = InMemoryTransport::new();
        let first = envelope();
        let second = envelope();

        transport.dispatch("queue:a", first.clone()).await.unwrap();
        transport.dispatch("queue:a", second.clone()).await.unwrap();
        transport.dispatch("queue:b", envelope()).await.unwrap();

        assert_eq!(transport.pending("queue:a").unwrap(), 2);
        assert_eq!(transport.receive("queue:a").unwrap(), Some(first));
        assert_eq!(transport.receive("queue:a").unwrap(), Some(second));
        assert_eq!(transport.receive("queue:a").unwrap(), None);
        assert_eq!(transport.pending("queue:b").unwrap(), 1);
    }

    #[test]
    fn test_receive_unknown_address() {
        let transport = InMemoryTransport::new();
        assert_eq!(transport.receive("queue:none").unwrap(), None);
        assert_eq!(transport.pending("queue:none").unwrap(), 0);
    }
}
