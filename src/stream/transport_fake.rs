//! Fake transport for testing
//!
//! Uses scripted lines and a feed handle instead of real HTTP calls.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::stream::transport_types::{EventSender, StreamError, StreamTransport, TransportEvent};

/// Shared state between a `FakeTransport` and its `FakeFeed`s
#[derive(Debug, Default)]
struct FeedState {
    sink: Option<EventSender>,
    opened_url: Option<String>,
    open_count: usize,
    closed: bool,
}

/// Fake transport for testing
#[derive(Debug, Default)]
pub struct FakeTransport {
    /// Lines delivered right after a successful open
    pub scripted_lines: Vec<String>,
    /// Send an explicit open-acknowledgement on open
    pub acknowledge_open: bool,
    /// Handshake error to return (if set)
    pub refuse_with: Option<StreamError>,
    /// Body returned by `get_text`
    pub response_body: String,
    /// Error returned by `get_text` (if set)
    pub fetch_error: Option<StreamError>,
    state: Arc<Mutex<FeedState>>,
}

impl FakeTransport {
    /// Create fake transport that accepts the handshake
    pub fn new() -> Self {
        Self {
            acknowledge_open: true,
            ..Self::default()
        }
    }

    /// Create fake transport that delivers `lines` as soon as it is opened
    pub fn with_lines(lines: &[&str]) -> Self {
        Self {
            scripted_lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::new()
        }
    }

    /// Create fake transport whose handshake fails with `err`
    pub fn refusing(err: StreamError) -> Self {
        Self {
            refuse_with: Some(err),
            ..Self::new()
        }
    }

    /// Create fake transport that answers `get_text` with `body`
    pub fn with_response(body: &str) -> Self {
        Self {
            response_body: body.to_string(),
            ..Self::new()
        }
    }

    /// Create fake transport whose `get_text` fails with `err`
    pub fn with_fetch_error(err: StreamError) -> Self {
        Self {
            fetch_error: Some(err),
            ..Self::new()
        }
    }

    /// Skip the open-acknowledgement; the first line then marks the stream live
    pub fn without_ack(mut self) -> Self {
        self.acknowledge_open = false;
        self
    }

    /// Handle for pushing events after the transport is opened
    pub fn feed(&self) -> FakeFeed {
        FakeFeed {
            state: self.state.clone(),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl StreamTransport for FakeTransport {
    fn open_stream(&mut self, url: &str, sink: EventSender) -> Result<(), StreamError> {
        if let Some(ref err) = self.refuse_with {
            return Err(err.clone());
        }
        if self.acknowledge_open {
            let _ = sink.send(TransportEvent::Opened);
        }
        for line in &self.scripted_lines {
            let _ = sink.send(TransportEvent::Line(line.clone()));
        }

        let mut state = self.state();
        state.sink = Some(sink);
        state.opened_url = Some(url.to_string());
        state.open_count += 1;
        Ok(())
    }

    fn get_text(&self, _url: &str) -> Result<String, StreamError> {
        if let Some(ref err) = self.fetch_error {
            return Err(err.clone());
        }
        Ok(self.response_body.clone())
    }

    fn close(&mut self) {
        let mut state = self.state();
        state.sink = None;
        state.closed = true;
    }
}

/// Feed handle for a `FakeTransport`
///
/// Plays the server side: everything pushed here reaches the session the
/// same way a real transport's reader thread would deliver it.
#[derive(Debug, Clone)]
pub struct FakeFeed {
    state: Arc<Mutex<FeedState>>,
}

impl FakeFeed {
    /// Push one line; returns false if nothing is listening
    pub fn push_line(&self, line: &str) -> bool {
        self.send(TransportEvent::Line(line.to_string()))
    }

    /// Push several lines in order
    pub fn push_lines(&self, lines: &[&str]) -> usize {
        lines.iter().filter(|line| self.push_line(line)).count()
    }

    /// Fail the stream with a network error
    pub fn fail(&self, msg: &str) -> bool {
        self.send(TransportEvent::Failed(StreamError::Network(msg.to_string())))
    }

    /// End the stream cleanly
    pub fn end(&self) -> bool {
        self.send(TransportEvent::Ended)
    }

    /// URL passed to the last successful open
    pub fn opened_url(&self) -> Option<String> {
        lock(&self.state).opened_url.clone()
    }

    /// Number of successful opens
    pub fn open_count(&self) -> usize {
        lock(&self.state).open_count
    }

    /// Check if the transport has been closed
    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Check if a sink is registered
    pub fn has_listener(&self) -> bool {
        lock(&self.state).sink.is_some()
    }

    fn send(&self, event: TransportEvent) -> bool {
        match lock(&self.state).sink {
            Some(ref sink) => sink.send(event).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_fake_transport_scripted_lines() {
        let mut transport = FakeTransport::with_lines(&["line1", "line2"]);
        let (tx, rx) = channel();
        transport.open_stream("http://test/logs", tx).unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                TransportEvent::Opened,
                TransportEvent::Line("line1".to_string()),
                TransportEvent::Line("line2".to_string()),
            ]
        );
    }

    #[test]
    fn test_fake_transport_refusal() {
        let mut transport = FakeTransport::refusing(StreamError::Http { status: 503 });
        let (tx, rx) = channel();
        let result = transport.open_stream("http://test/logs", tx);
        assert_eq!(result, Err(StreamError::Http { status: 503 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_feed_before_open_is_not_delivered() {
        let transport = FakeTransport::new();
        let feed = transport.feed();
        assert!(!feed.push_line("early"));
        assert!(!feed.has_listener());
    }

    #[test]
    fn test_feed_after_close_is_not_delivered() {
        let mut transport = FakeTransport::new();
        let feed = transport.feed();
        let (tx, rx) = channel();
        transport.open_stream("http://test/logs", tx).unwrap();
        assert!(feed.push_line("live"));

        transport.close();
        assert!(feed.is_closed());
        assert!(!feed.push_line("late"));

        let lines: Vec<_> = rx
            .try_iter()
            .filter_map(|e| match e {
                TransportEvent::Line(l) => Some(l),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["live"]);
    }

    #[test]
    fn test_fake_get_text() {
        let transport = FakeTransport::with_response(r#"["a"]"#);
        assert_eq!(transport.get_text("http://test").unwrap(), r#"["a"]"#);

        let transport = FakeTransport::with_fetch_error(StreamError::Http { status: 404 });
        assert!(transport.get_text("http://test").is_err());
    }
}
