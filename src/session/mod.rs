//! Log stream session
//!
//! Owns one push connection and the ordered buffer of lines it delivered.
//!
//! Delivery model:
//! - the transport posts `TransportEvent`s into a channel (its sink)
//! - the owner calls `pump()` on its own thread to drain them
//! - all `buffer`/`status` mutation happens inside `pump()`, so there is
//!   no locking and lines land in exact delivery order
//!
//! Pausing is a filter: lines arriving while paused are dropped, not held.

mod buffer;
mod errors;

pub use buffer::LineBuffer;
pub use errors::ConnectionError;

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::stream::{EventReceiver, StreamTransport, Transport, TransportEvent};

/// Session connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Not connected (initial state, or the server ended the stream)
    Disconnected,
    /// Handshake done, waiting for the stream to go live
    Connecting,
    /// Receiving and appending lines
    Streaming,
    /// Receiving but dropping lines
    Paused,
    /// Transport released; terminal
    Closed,
    /// Transport failed; see `last_error`
    Errored,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Streaming => "streaming",
            SessionStatus::Paused => "paused",
            SessionStatus::Closed => "closed",
            SessionStatus::Errored => "errored",
        }
    }

    /// Check if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Closed)
    }

    /// Check if the transport is still expected to deliver lines
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SessionStatus::Connecting | SessionStatus::Streaming | SessionStatus::Paused
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One live log feed and its accumulated output
#[derive(Debug)]
pub struct LogStreamSession {
    endpoint: String,
    status: SessionStatus,
    buffer: LineBuffer,
    last_error: Option<ConnectionError>,
    transport: Transport,
    /// Message sink receiver; `Some` between open and close
    events: Option<EventReceiver>,
    opened: bool,
    dropped_while_paused: u64,
}

impl LogStreamSession {
    /// Create a session in `Disconnected`; nothing is allocated until `open()`
    pub fn new(endpoint: impl Into<String>, transport: impl Into<Transport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: SessionStatus::Disconnected,
            buffer: LineBuffer::new(),
            last_error: None,
            transport: transport.into(),
            events: None,
            opened: false,
            dropped_while_paused: 0,
        }
    }

    /// Bound the buffer to `capacity` lines (oldest evicted first)
    ///
    /// Lines already buffered are kept, minus any overflow.
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.buffer.set_capacity(capacity);
        self
    }

    /// Create and open a session
    ///
    /// A failed handshake is contained in the returned session
    /// (`Errored` + `last_error`).
    pub fn connect(endpoint: impl Into<String>, transport: impl Into<Transport>) -> Self {
        let mut session = Self::new(endpoint, transport);
        // Failure is recorded in status/last_error
        let _ = session.open();
        session
    }

    /// Open the transport and register this session as its message sink
    ///
    /// Sets `Connecting`; the stream goes `Streaming` on the transport's
    /// open-acknowledgement or its first line.
    pub fn open(&mut self) -> Result<(), ConnectionError> {
        if self.status == SessionStatus::Closed {
            return Err(ConnectionError::Closed);
        }
        if self.opened {
            return Err(ConnectionError::AlreadyOpened);
        }
        self.opened = true;

        let (tx, rx) = mpsc::channel();
        self.set_status(SessionStatus::Connecting);

        match self.transport.open_stream(&self.endpoint, tx) {
            Ok(()) => {
                self.events = Some(rx);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                let err = ConnectionError::from_handshake(e);
                warn!(endpoint = %self.endpoint, error = %err, "log stream handshake failed");
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    /// Drain pending transport notifications
    ///
    /// Returns the number of lines appended to the buffer.
    pub fn pump(&mut self) -> usize {
        let mut appended = 0;
        self.drain(None, &mut |_: &str| appended += 1);
        appended
    }

    /// Wait up to `timeout` for the first notification, then drain
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        let mut appended = 0;
        self.pump_timeout_with(timeout, |_| appended += 1);
        appended
    }

    /// Like `pump_timeout`, handing each appended line to `on_append`
    ///
    /// Lines are handed over as they land, before the capacity policy can
    /// evict them.
    pub fn pump_timeout_with(&mut self, timeout: Duration, mut on_append: impl FnMut(&str)) {
        let received = self.events.as_ref().map(|rx| rx.recv_timeout(timeout));
        let first = match received {
            Some(Ok(event)) => Some(event),
            Some(Err(RecvTimeoutError::Disconnected)) => {
                self.sink_lost();
                None
            }
            Some(Err(RecvTimeoutError::Timeout)) | None => None,
        };
        self.drain(first, &mut on_append);
    }

    /// Pause (`true`) or resume (`false`)
    ///
    /// Only `Streaming -> Paused` and `Paused -> Streaming` apply; anything
    /// else is a no-op. The transport is untouched either way.
    pub fn pause(&mut self, value: bool) {
        match (value, self.status) {
            (true, SessionStatus::Streaming) => self.set_status(SessionStatus::Paused),
            (false, SessionStatus::Paused) => self.set_status(SessionStatus::Streaming),
            _ => {}
        }
    }

    /// Empty the buffer; status is unchanged
    pub fn clear(&mut self) {
        debug!(lines = self.buffer.len(), "clearing log buffer");
        self.buffer.clear();
    }

    /// Release the transport and move to `Closed`. Idempotent.
    ///
    /// No notification is observed once this returns.
    pub fn close(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        // Unregister the sink first so nothing more can be drained
        self.events = None;
        self.transport.close();
        self.set_status(SessionStatus::Closed);
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Snapshot of the buffered lines
    pub fn lines(&self) -> Vec<String> {
        self.buffer.to_vec()
    }

    pub fn last_error(&self) -> Option<&ConnectionError> {
        self.last_error.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.status == SessionStatus::Paused
    }

    /// Lines discarded because they arrived while paused
    pub fn dropped_while_paused(&self) -> u64 {
        self.dropped_while_paused
    }

    fn drain(&mut self, first: Option<TransportEvent>, on_append: &mut dyn FnMut(&str)) {
        if let Some(event) = first {
            self.apply(event, on_append);
        }
        while let Some(event) = self.next_event() {
            self.apply(event, on_append);
        }
    }

    fn next_event(&mut self) -> Option<TransportEvent> {
        let received = self.events.as_ref()?.try_recv();
        match received {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.sink_lost();
                None
            }
        }
    }

    /// Apply one notification
    fn apply(&mut self, event: TransportEvent, on_append: &mut dyn FnMut(&str)) {
        match event {
            TransportEvent::Opened => {
                if self.status == SessionStatus::Connecting {
                    self.set_status(SessionStatus::Streaming);
                }
            }
            TransportEvent::Line(line) => self.on_line(line, on_append),
            TransportEvent::Failed(e) => {
                if self.status.is_live() {
                    let err = ConnectionError::from_stream(e);
                    warn!(endpoint = %self.endpoint, error = %err, "log stream failed");
                    self.fail(err);
                }
            }
            TransportEvent::Ended => {
                if self.status.is_live() {
                    info!(endpoint = %self.endpoint, "log stream ended by server");
                    self.events = None;
                    self.set_status(SessionStatus::Disconnected);
                }
            }
        }
    }

    fn on_line(&mut self, line: String, on_append: &mut dyn FnMut(&str)) {
        match self.status {
            SessionStatus::Connecting => {
                // First successful frame doubles as the open-acknowledgement
                self.set_status(SessionStatus::Streaming);
                on_append(&line);
                self.buffer.push(line);
            }
            SessionStatus::Streaming => {
                on_append(&line);
                self.buffer.push(line);
            }
            SessionStatus::Paused => {
                self.dropped_while_paused += 1;
            }
            _ => {}
        }
    }

    /// All senders are gone without a terminal notification
    fn sink_lost(&mut self) {
        self.events = None;
        if self.status.is_live() {
            self.fail(ConnectionError::Dropped(
                "transport stopped without notice".to_string(),
            ));
        }
    }

    fn fail(&mut self, err: ConnectionError) {
        self.last_error = Some(err);
        self.events = None;
        self.set_status(SessionStatus::Errored);
    }

    fn set_status(&mut self, next: SessionStatus) {
        if self.status != next {
            info!(endpoint = %self.endpoint, from = %self.status, to = %next, "log stream status");
            self.status = next;
        }
    }
}

impl Drop for LogStreamSession {
    fn drop(&mut self) {
        self.close();
    }
}
