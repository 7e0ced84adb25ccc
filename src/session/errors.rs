//! Session errors
//!
//! Error types for log stream session operations.

use crate::stream::StreamError;

/// Connection errors
///
/// Held in `last_error`, so the type is `Clone` and carries strings only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Handshake rejected with HTTP {status}")]
    Handshake { status: u16 },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Stream dropped: {0}")]
    Dropped(String),

    #[error("Session already opened")]
    AlreadyOpened,

    #[error("Session closed")]
    Closed,
}

impl ConnectionError {
    /// Map a transport error raised during the handshake
    pub fn from_handshake(err: StreamError) -> Self {
        match err {
            StreamError::Http { status } => ConnectionError::Handshake { status },
            StreamError::InvalidUrl(msg) => ConnectionError::InvalidEndpoint(msg),
            StreamError::Network(msg) | StreamError::Io(msg) => ConnectionError::Unreachable(msg),
        }
    }

    /// Map a transport error raised after the stream was live
    pub fn from_stream(err: StreamError) -> Self {
        ConnectionError::Dropped(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_mapping() {
        assert_eq!(
            ConnectionError::from_handshake(StreamError::Http { status: 502 }),
            ConnectionError::Handshake { status: 502 }
        );
        assert!(matches!(
            ConnectionError::from_handshake(StreamError::Network("refused".to_string())),
            ConnectionError::Unreachable(_)
        ));
        assert!(matches!(
            ConnectionError::from_handshake(StreamError::InvalidUrl("x".to_string())),
            ConnectionError::InvalidEndpoint(_)
        ));
    }

    #[test]
    fn test_stream_mapping_keeps_cause() {
        let err = ConnectionError::from_stream(StreamError::Network("reset by peer".to_string()));
        assert!(err.to_string().contains("reset by peer"));
    }

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::Handshake { status: 404 };
        assert_eq!(err.to_string(), "Handshake rejected with HTTP 404");
    }
}
