//! Payload contract for messages carried on the bus.

use serde::{de::DeserializeOwned, Serialize};
use std::any::type_name;
use uuid::Uuid;

/// A message payload.
///
/// Payload types that represent a business entity override
/// [`correlation_id`](Message::correlation_id) to expose their correlating
/// field; every other type leaves the outbound correlation id unset.
pub trait Message: Serialize + DeserializeOwned + Send + Sync {
    /// Name used on the wire and to derive publish destinations.
    ///
    /// Module paths are stripped from the type and from each of its generic
    /// parameters, so `Batch<orders::Line>` becomes `Batch<Line>`.
    fn message_type() -> String {
        short_type_name(type_name::<Self>())
    }

    /// The value of the payload's correlating field, if it has one.
    fn correlation_id(&self) -> Option<Uuid> {
        None
    }
}

/// Drop the module path from every path segment of a type name.
fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut path = String::new();

    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
            continue;
        }
        short.push_str(path.rsplit("::").next().unwrap_or_default());
        path.clear();
        short.push(ch);
    }
    short.push_str(path.rsplit("::").next().unwrap_or_default());
    short
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_message_type_is_short_name() {
        assert_eq!(PingMessage::message_type(), "PingMessage");
        assert_eq!(Heartbeat::message_type(), "Heartbeat");
    }

    #[test]
    fn test_generic_message_type_keeps_outer_name() {
        assert_eq!(Batch::<Heartbeat>::message_type(), "Batch<Heartbeat>");
        assert_eq!(Batch::<PingMessage>::message_type(), "Batch<PingMessage>");
        assert_ne!(
            Batch::<Heartbeat>::message_type(),
            Batch::<Batch<Heartbeat>>::message_type()
        );
        assert_eq!(
            Batch::<Batch<Heartbeat>>::message_type(),
            "Batch<Batch<Heartbeat>>"
        );
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Pair<a::X, std::string::String>"), "Pair<X, String>");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_default_correlation_is_none() {
        assert_eq!(Heartbeat { sequence: 1 }.correlation_id(), None);
    }
}
