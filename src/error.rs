//! Error types for Courier.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No response address on inbound message {0}")]
    NoResponseAddress(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::Config("bus.source_address must not be empty".to_string()).to_string(),
            "Configuration error: bus.source_address must not be empty"
        );
        assert_eq!(
            Error::NoResponseAddress("42".to_string()).to_string(),
            "No response address on inbound message 42"
        );
        assert_eq!(Error::NotFound("MessageId header".to_string()).to_string(), "Not found: MessageId header");
    }

    #[test]
    fn test_json_errors_convert() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
