//! `tail` command
//!
//! Drives one `LogStreamSession` from the main thread: drains transport
//! notifications, prints newly appended lines and applies interactive
//! commands read from stdin on a helper thread.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::session::{ConnectionError, LogStreamSession, SessionStatus};

/// Poll interval of the tail loop
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interactive commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// `p`: pause / resume
    TogglePause,
    /// `c`: clear the buffer
    Clear,
    /// `s`: print status
    Status,
    /// `q`: quit
    Quit,
}

/// Parse one line of interactive input
pub fn parse_control(input: &str) -> Option<Control> {
    match input.trim() {
        "p" | "pause" | "resume" => Some(Control::TogglePause),
        "c" | "clear" => Some(Control::Clear),
        "s" | "status" => Some(Control::Status),
        "q" | "quit" | "exit" => Some(Control::Quit),
        _ => None,
    }
}

/// How a tail run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOutcome {
    /// Session status right before it was closed
    pub final_status: SessionStatus,
    pub last_error: Option<ConnectionError>,
    pub lines_printed: u64,
    /// True if the user asked to quit
    pub quit_requested: bool,
}

impl TailOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self.final_status {
            SessionStatus::Errored => super::EXIT_FAILURE,
            _ => super::EXIT_SUCCESS,
        }
    }
}

/// Spawn the stdin reader; EOF on stdin just stops the reader
pub fn spawn_control_reader() -> Receiver<Control> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if let Some(control) = parse_control(&line) {
                if tx.send(control).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

/// Run the tail loop until the stream stops or the user quits
///
/// Lines go to `out`, status reports to `diag`. The session is closed
/// before returning, on every path.
pub fn run_tail<W: Write, D: Write>(
    session: &mut LogStreamSession,
    controls: &Receiver<Control>,
    out: &mut W,
    diag: &mut D,
    poll: Duration,
) -> io::Result<TailOutcome> {
    let result = tail_loop(session, controls, out, diag, poll);
    let final_status = session.status();
    let last_error = session.last_error().cloned();
    session.close();

    let (lines_printed, quit_requested) = result?;
    Ok(TailOutcome {
        final_status,
        last_error,
        lines_printed,
        quit_requested,
    })
}

fn tail_loop<W: Write, D: Write>(
    session: &mut LogStreamSession,
    controls: &Receiver<Control>,
    out: &mut W,
    diag: &mut D,
    poll: Duration,
) -> io::Result<(u64, bool)> {
    let mut printed = 0u64;

    loop {
        loop {
            match controls.try_recv() {
                Ok(Control::Quit) => return Ok((printed, true)),
                Ok(control) => apply_control(session, control, diag)?,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let mut fresh = Vec::new();
        session.pump_timeout_with(poll, |line| fresh.push(line.to_string()));
        if !fresh.is_empty() {
            for line in &fresh {
                writeln!(out, "{}", line)?;
            }
            printed += fresh.len() as u64;
            out.flush()?;
        }

        if !session.status().is_live() {
            debug!(status = %session.status(), "tail loop finished");
            if let Some(err) = session.last_error() {
                writeln!(diag, "# stream error: {}", err)?;
            }
            return Ok((printed, false));
        }
    }
}

fn apply_control<D: Write>(
    session: &mut LogStreamSession,
    control: Control,
    diag: &mut D,
) -> io::Result<()> {
    match control {
        Control::TogglePause => {
            let pause = !session.is_paused();
            session.pause(pause);
            writeln!(diag, "# {}", session.status())?;
        }
        Control::Clear => {
            session.clear();
            writeln!(diag, "# buffer cleared")?;
        }
        Control::Status => {
            let buffer = session.buffer();
            let capacity = buffer
                .capacity()
                .map_or_else(|| "unbounded".to_string(), |cap| cap.to_string());
            writeln!(
                diag,
                "# status={} buffered={}/{} dropped_while_paused={}",
                session.status(),
                buffer.len(),
                capacity,
                session.dropped_while_paused()
            )?;
        }
        Control::Quit => {}
    }
    Ok(())
}
