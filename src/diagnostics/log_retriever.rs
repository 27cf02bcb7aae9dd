// SPDX-License-Identifier: MPL-2.0
//! Retrieval of this process's lines from the device log.
//!
//! A one-shot dump is read line by line and every line that contains the
//! process id as a plain substring is kept, in original order. The match is
//! textual, not a parse of the pid column: a pid of `1` also keeps any line
//! with a `1` in it.
//!
//! The dump is drained on a reader thread so the caller can give up at a
//! deadline; when it does, the producer is aborted and whatever was kept so
//! far is returned.

use std::io::{self, BufRead};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{unbounded, RecvTimeoutError};

use crate::application::port::LogSource;
use crate::domain::diagnostics::ReadTimeout;
use crate::error::Error;
use crate::logging::log_failure;

/// Whether `line` belongs to the process whose id renders as `pid_text`.
#[must_use]
pub fn line_matches(line: &str, pid_text: &str) -> bool {
    line.contains(pid_text)
}

/// Keeps the lines that mention `pid`, preserving order.
pub fn filter_lines<I>(lines: I, pid: u32) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let pid_text = pid.to_string();
    lines
        .into_iter()
        .filter(|line| line_matches(line, &pid_text))
        .collect()
}

/// Dumps the log and keeps the lines of the calling process.
#[must_use]
pub fn retrieve_own_process_log(source: &dyn LogSource, timeout: ReadTimeout) -> Vec<String> {
    retrieve_process_log(source, std::process::id(), timeout)
}

/// Dumps the log and keeps the lines that mention `pid`.
///
/// Never fails: a launch failure yields an empty snapshot, a read failure or
/// an expired deadline yields the lines accumulated so far.
#[must_use]
pub fn retrieve_process_log(source: &dyn LogSource, pid: u32, timeout: ReadTimeout) -> Vec<String> {
    let dump = match source.open() {
        Ok(dump) => dump,
        Err(err) => {
            log_failure("launching log dump", &err);
            return Vec::new();
        }
    };
    let (stream, mut abort) = dump.into_parts();

    let (line_tx, line_rx) = unbounded::<io::Result<String>>();
    let reader = thread::Builder::new()
        .name("log-reader".to_string())
        .spawn(move || {
            let mut stream = stream;
            loop {
                match read_line_lossy(&mut stream) {
                    Ok(Some(line)) => {
                        if line_tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        let _ = line_tx.send(Err(err));
                        break;
                    }
                }
            }
        });
    let reader = match reader {
        Ok(handle) => handle,
        Err(err) => {
            log_failure("starting log reader", &Error::StreamReadFailure(err));
            if let Some(abort) = abort.take() {
                abort();
            }
            return Vec::new();
        }
    };

    let pid_text = pid.to_string();
    let deadline = Instant::now() + timeout.as_duration();
    let mut retained = Vec::new();
    let mut timed_out = false;

    loop {
        match line_rx.recv_deadline(deadline) {
            Ok(Ok(line)) => {
                if line_matches(&line, &pid_text) {
                    retained.push(line);
                }
            }
            Ok(Err(err)) => {
                log_failure("reading log dump", &Error::StreamReadFailure(err));
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_secs = timeout.value(),
                    kept = retained.len(),
                    "log dump exceeded its deadline, keeping partial snapshot"
                );
                timed_out = true;
                break;
            }
        }
    }

    if timed_out {
        if let Some(abort) = abort.take() {
            abort();
        }
    } else {
        let _ = reader.join();
    }

    tracing::debug!(pid, kept = retained.len(), "log snapshot retrieved");
    retained
}

/// Reads one line, decoding invalid UTF-8 lossily. `None` at end of stream.
fn read_line_lossy(stream: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    if stream.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
