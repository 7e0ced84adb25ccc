//! logstream: live log stream consumer
//!
//! A `LogStreamSession` owns one server-push connection and the ordered
//! buffer of lines it delivered. Observers read `buffer()` and `status()`;
//! the owner calls `pause`, `clear` and `close`.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod session;
pub mod stream;

// Re-export the session surface
pub use session::{ConnectionError, LineBuffer, LogStreamSession, SessionStatus};
pub use stream::{FakeFeed, FakeTransport, HttpTransport, StreamError, Transport};

// Re-export collaborators
pub use catalog::{CatalogClient, FetchError, Fetched};
pub use config::{Config, ConfigError};
