//! Push-stream transports
//!
//! Connection layer underneath `LogStreamSession`:
//! - `HttpTransport`: blocking HTTP, body read on a reader thread
//! - `FakeTransport`: scripted delivery for tests
//! - `sse`: `text/event-stream` decoding

pub mod sse;
pub mod transport;
pub mod transport_fake;
pub mod transport_http;
pub mod transport_types;

// Re-export common types
pub use transport::Transport;
pub use transport_fake::{FakeFeed, FakeTransport};
pub use transport_http::{HttpTimeouts, HttpTransport};
pub use transport_types::{EventReceiver, EventSender, StreamError, StreamTransport, TransportEvent};
