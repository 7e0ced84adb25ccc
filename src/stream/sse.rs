//! Server-Sent Events decoding
//!
//! Incremental `text/event-stream` decoder. Lines are fed one at a time
//! (without the trailing newline); a complete event is returned when the
//! blank line that terminates it arrives.

/// One dispatched SSE event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, if the server named the event
    pub event: Option<String>,
    /// Last `id:` field seen in this event
    pub id: Option<String>,
    /// `data:` fields, in arrival order
    pub data: Vec<String>,
}

impl SseEvent {
    /// Log lines carried by this event (one per `data` field)
    pub fn into_lines(self) -> impl Iterator<Item = String> {
        self.data.into_iter()
    }
}

/// Incremental SSE decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: SseEvent,
    /// Reconnection delay advertised by the server (`retry:` field, ms)
    retry_ms: Option<u64>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconnection delay the server asked for, if any
    pub fn retry_ms(&self) -> Option<u64> {
        self.retry_ms
    }

    /// Feed one line; returns an event when `line` terminates one
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }

        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.pending.data.push(value.to_string()),
            "event" => self.pending.event = Some(value.to_string()),
            "id" => {
                // ids containing NUL are ignored by the event-stream grammar
                if !value.contains('\0') {
                    self.pending.id = Some(value.to_string());
                }
            }
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry_ms = Some(ms);
                }
            }
            _ => {}
        }
        None
    }

    /// Flush the pending event at end of stream
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.pending);
        if event.data.is_empty() {
            None
        } else {
            Some(event)
        }
    }
}

/// Decode a complete SSE body into log lines
pub fn decode_body(body: &str) -> Vec<String> {
    let mut decoder = SseDecoder::new();
    let mut lines = Vec::new();
    for line in body.lines() {
        if let Some(event) = decoder.push_line(line) {
            lines.extend(event.into_lines());
        }
    }
    if let Some(event) = decoder.finish() {
        lines.extend(event.into_lines());
    }
    lines
}
