//! Real HTTP transport using ureq
//!
//! The handshake runs on the caller's thread; the response body is read on
//! a dedicated reader thread that only forwards `TransportEvent`s.
//!
//! Socket reads on the stream connection use a short read timeout. While
//! waiting for response headers it bounds the handshake; on the body it
//! only wakes the reader so it can notice `close()` on a quiet stream.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::stream::sse::SseDecoder;
use crate::stream::transport_types::{EventSender, StreamError, StreamTransport, TransportEvent};

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default read poll interval in milliseconds
pub const DEFAULT_READ_POLL_MS: u64 = 500;
/// Default deadline for one-shot GETs in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeouts used by `HttpTransport`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP connect
    pub connect: Duration,
    /// Longest silence while waiting for stream headers; also how often the
    /// body reader checks for shutdown
    pub read_poll: Duration,
    /// Whole-request deadline for `get_text`
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_poll: Duration::from_millis(DEFAULT_READ_POLL_MS),
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Real HTTP transport
#[derive(Debug)]
pub struct HttpTransport {
    agent: ureq::Agent,
    timeouts: HttpTimeouts,
    reader: Option<ReaderHandle>,
}

/// Background body reader (for cleanup)
#[derive(Debug)]
struct ReaderHandle {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl HttpTransport {
    /// Create new transport with default timeouts
    pub fn new() -> Self {
        Self::with_timeouts(HttpTimeouts::default())
    }

    /// Create transport with custom timeouts
    pub fn with_timeouts(timeouts: HttpTimeouts) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeouts.connect)
            .timeout_read(timeouts.read_poll)
            .build();
        Self {
            agent,
            timeouts,
            reader: None,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTransport for HttpTransport {
    fn open_stream(&mut self, url: &str, sink: EventSender) -> Result<(), StreamError> {
        debug!(url, "opening log stream");
        let response = self
            .agent
            .get(url)
            .set("Accept", "text/event-stream")
            .set("Cache-Control", "no-cache")
            .call()?;

        let is_sse = response.content_type().starts_with("text/event-stream");
        debug!(status = response.status(), is_sse, "log stream handshake accepted");

        // The handshake itself is the open-acknowledgement
        let _ = sink.send(TransportEvent::Opened);

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let body = response.into_reader();

        let handle = thread::Builder::new()
            .name("logstream-reader".to_string())
            .spawn(move || read_body(body, is_sse, &sink, &shutdown_clone))
            .map_err(StreamError::from)?;

        self.reader = Some(ReaderHandle { handle, shutdown });
        Ok(())
    }

    fn get_text(&self, url: &str) -> Result<String, StreamError> {
        debug!(url, "GET");
        let response = self.agent.get(url).timeout(self.timeouts.request).call()?;
        let mut body = String::new();
        response.into_reader().read_to_string(&mut body)?;
        Ok(body)
    }

    fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.shutdown.store(true, Ordering::SeqCst);
            // Bounded by one read poll; the body (and its socket) is dropped
            // when the thread returns
            if reader.handle.join().is_err() {
                warn!("log stream reader panicked");
            }
            debug!("log stream reader released");
        }
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read the response body line by line and forward events
///
/// Runs on the reader thread. Stops as soon as shutdown is requested or the
/// receiving side is gone. Read timeouts are idle ticks, not failures.
fn read_body(body: impl Read, is_sse: bool, sink: &EventSender, shutdown: &AtomicBool) {
    let mut reader = BufReader::new(body);
    let mut decoder = SseDecoder::new();
    let mut raw = Vec::new();

    let forward = |event: TransportEvent| -> bool {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        sink.send(event).is_ok()
    };

    loop {
        if shutdown.load(Ordering::SeqCst) {
            debug!("log stream reader stopping");
            return;
        }
        // A timed-out read keeps what it consumed in `raw`, so only a
        // complete line resets it
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {
                if raw.last() != Some(&b'\n') {
                    // Unterminated tail; EOF follows on the next read
                    continue;
                }
                if !forward_line(&raw, is_sse, &mut decoder, &forward) {
                    return;
                }
                raw.clear();
            }
            Err(e) if is_idle_tick(&e) => continue,
            Err(e) => {
                warn!(error = %e, "log stream read failed");
                forward(TransportEvent::Failed(StreamError::Network(e.to_string())));
                return;
            }
        }
    }

    if !raw.is_empty() && !forward_line(&raw, is_sse, &mut decoder, &forward) {
        return;
    }
    if is_sse {
        if let Some(event) = decoder.finish() {
            for data in event.into_lines() {
                if !forward(TransportEvent::Line(data)) {
                    return;
                }
            }
        }
    }
    debug!("log stream ended by server");
    forward(TransportEvent::Ended);
}

/// Decode one raw line and forward what it yields; false once delivery stops
fn forward_line(
    raw: &[u8],
    is_sse: bool,
    decoder: &mut SseDecoder,
    forward: &impl Fn(TransportEvent) -> bool,
) -> bool {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_end_matches('\n');

    if is_sse {
        if let Some(event) = decoder.push_line(line) {
            for data in event.into_lines() {
                if !forward(TransportEvent::Line(data)) {
                    return false;
                }
            }
        }
        true
    } else {
        let line = line.strip_suffix('\r').unwrap_or(line);
        forward(TransportEvent::Line(line.to_string()))
    }
}

fn is_idle_tick(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{self, Cursor};
    use std::sync::mpsc::channel;

    /// Body that replays chunks and errors, then reports EOF
    struct Scripted {
        steps: VecDeque<io::Result<&'static [u8]>>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.steps.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(bytes);
                    Ok(bytes.len())
                }
            }
        }
    }

    /// Body that never produces data and raises `shutdown` after a few polls
    struct Quiet {
        polls: usize,
        shutdown: Arc<AtomicBool>,
    }

    impl Read for Quiet {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.polls += 1;
            if self.polls == 3 {
                self.shutdown.store(true, Ordering::SeqCst);
            }
            Err(io::Error::new(ErrorKind::TimedOut, "timed out reading response"))
        }
    }

    fn collect(body: &str, is_sse: bool) -> Vec<TransportEvent> {
        let (tx, rx) = channel();
        let shutdown = AtomicBool::new(false);
        read_body(Cursor::new(body.as_bytes().to_vec()), is_sse, &tx, &shutdown);
        drop(tx);
        rx.into_iter().collect()
    }

    #[test]
    fn test_read_sse_body() {
        let events = collect("data: a\n\n: ping\n\ndata: b\n\n", true);
        assert_eq!(
            events,
            vec![
                TransportEvent::Line("a".to_string()),
                TransportEvent::Line("b".to_string()),
                TransportEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_read_plain_body() {
        let events = collect("one\r\ntwo\nthree", false);
        assert_eq!(
            events,
            vec![
                TransportEvent::Line("one".to_string()),
                TransportEvent::Line("two".to_string()),
                TransportEvent::Line("three".to_string()),
                TransportEvent::Ended,
            ]
        );
    }

    #[test]
    fn test_shutdown_stops_forwarding() {
        let (tx, rx) = channel();
        let shutdown = AtomicBool::new(true);
        read_body(Cursor::new(b"data: a\n\n".to_vec()), true, &tx, &shutdown);
        drop(tx);
        assert_eq!(rx.into_iter().count(), 0);
    }

    #[test]
    fn test_read_timeout_mid_line_is_not_a_failure() {
        let (tx, rx) = channel();
        let shutdown = AtomicBool::new(false);
        let body = Scripted {
            steps: VecDeque::from(vec![
                Ok(&b"data: he"[..]),
                Err(io::Error::new(ErrorKind::TimedOut, "timed out")),
                Err(io::Error::new(ErrorKind::WouldBlock, "would block")),
                Ok(&b"llo\n\n"[..]),
            ]),
        };
        read_body(body, true, &tx, &shutdown);
        drop(tx);
        assert_eq!(
            rx.into_iter().collect::<Vec<_>>(),
            vec![TransportEvent::Line("hello".to_string()), TransportEvent::Ended]
        );
    }

    #[test]
    fn test_quiet_body_stops_on_shutdown() {
        let (tx, rx) = channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let body = Quiet {
            polls: 0,
            shutdown: shutdown.clone(),
        };
        read_body(body, true, &tx, &shutdown);
        drop(tx);
        assert_eq!(rx.into_iter().count(), 0);
    }

    #[test]
    fn test_other_read_errors_fail_the_stream() {
        let (tx, rx) = channel();
        let shutdown = AtomicBool::new(false);
        let body = Scripted {
            steps: VecDeque::from(vec![Err(io::Error::new(
                ErrorKind::ConnectionReset,
                "reset",
            ))]),
        };
        read_body(body, false, &tx, &shutdown);
        drop(tx);
        let events: Vec<_> = rx.into_iter().collect();
        assert!(matches!(events.as_slice(), [TransportEvent::Failed(StreamError::Network(_))]));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let mut transport = HttpTransport::new();
        let (tx, _rx) = channel();
        let err = transport.open_stream("not a url", tx).unwrap_err();
        assert!(matches!(err, StreamError::InvalidUrl(_)), "got {:?}", err);
    }
}
