//! Transport types
//!
//! Common types shared across transport implementations.

use std::sync::mpsc;

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Network error (connection refused, DNS failure, reset, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}")]
    Http { status: u16 },

    /// Endpoint could not be parsed as a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// IO error while reading a response body
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.to_string())
    }
}

impl From<ureq::Error> for StreamError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _response) => StreamError::Http { status: code },
            ureq::Error::Transport(err) => match err.kind() {
                ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                    StreamError::InvalidUrl(err.to_string())
                }
                _ => StreamError::Network(err.to_string()),
            },
        }
    }
}

/// Notification delivered by a transport to its owning session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake accepted, stream is live
    Opened,
    /// One inbound log line
    Line(String),
    /// Stream failed after the handshake
    Failed(StreamError),
    /// Server ended the stream cleanly
    Ended,
}

/// Channel sender registered as the message sink of a transport
pub type EventSender = mpsc::Sender<TransportEvent>;
/// Channel receiver drained by the owning session
pub type EventReceiver = mpsc::Receiver<TransportEvent>;

/// Push-stream transport
///
/// Abstraction over the connection so sessions can be tested with
/// `FakeTransport`.
pub trait StreamTransport: Send {
    /// Perform the handshake against `url` and register `sink` as the
    /// message handler.
    ///
    /// Returns once the handshake has completed; inbound messages are
    /// delivered through `sink` afterwards.
    fn open_stream(&mut self, url: &str, sink: EventSender) -> Result<(), StreamError>;

    /// GET `url` and return the full response body
    fn get_text(&self, url: &str) -> Result<String, StreamError>;

    /// Stop delivery and drop the registered sink. Idempotent.
    fn close(&mut self);
}
