//! Transport selection
//!
//! Concrete transport enum so sessions own their transport by value.

pub use crate::stream::transport_fake::{FakeFeed, FakeTransport};
pub use crate::stream::transport_http::HttpTransport;
pub use crate::stream::transport_types::{EventSender, StreamError, StreamTransport};

/// Concrete transport enum
///
/// Wraps all transport types; the session never sees a trait object.
#[derive(Debug)]
pub enum Transport {
    Http(HttpTransport),
    Fake(FakeTransport),
}

impl StreamTransport for Transport {
    fn open_stream(&mut self, url: &str, sink: EventSender) -> Result<(), StreamError> {
        match self {
            Transport::Http(t) => t.open_stream(url, sink),
            Transport::Fake(t) => t.open_stream(url, sink),
        }
    }

    fn get_text(&self, url: &str) -> Result<String, StreamError> {
        match self {
            Transport::Http(t) => t.get_text(url),
            Transport::Fake(t) => t.get_text(url),
        }
    }

    fn close(&mut self) {
        match self {
            Transport::Http(t) => t.close(),
            Transport::Fake(t) => t.close(),
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Http(HttpTransport::new())
    }
}

impl From<HttpTransport> for Transport {
    fn from(t: HttpTransport) -> Self {
        Transport::Http(t)
    }
}

impl From<FakeTransport> for Transport {
    fn from(t: FakeTransport) -> Self {
        Transport::Fake(t)
    }
}
