// SPDX-License-Identifier: MPL-2.0
//! Subprocess adapter implementing the [`LogSource`] port.
//!
//! Each [`LogSource::open`] spawns the configured command (by default
//! `logcat -d -v threadtime`) with stdout piped. The returned dump owns the
//! child: dropping the stream reaps it, and the abort hook kills it.
//!
//! [`LogSource`]: crate::application::port::LogSource

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};

use crate::application::port::{LogDump, LogSource};
use crate::config::Config;
use crate::error::{Error, Result};

/// Runs a one-shot log dump command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLogSource {
    program: String,
    args: Vec<String>,
}

impl CommandLogSource {
    /// `command[0]` is the program, the rest its arguments. An empty command
    /// fails at [`LogSource::open`].
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        let mut parts = command.into_iter();
        Self {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.log_command())
    }

    /// The full command line, for log messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl LogSource for CommandLogSource {
    fn open(&self) -> Result<LogDump> {
        let launch_error = |source| Error::SubprocessLaunchFailure {
            command: self.command_line(),
            source,
        };

        if self.program.is_empty() {
            return Err(launch_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "empty log command",
            )));
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(launch_error)?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(launch_error(io::Error::other("child stdout was not captured")));
        };
        tracing::debug!(command = %self.command_line(), pid = child.id(), "log dump started");

        let child = Arc::new(Mutex::new(child));
        let killer = Arc::clone(&child);
        let stream = ChildOutput {
            stdout: BufReader::new(stdout),
            child,
        };

        Ok(LogDump::new(stream).with_abort(move || {
            let mut child = killer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(err) = child.kill() {
                tracing::debug!(error = %err, "log dump already exited");
            }
        }))
    }
}

/// The child's stdout, reaping the child when dropped.
struct ChildOutput {
    stdout: BufReader<ChildStdout>,
    child: Arc<Mutex<Child>>,
}

impl Read for ChildOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl BufRead for ChildOutput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.stdout.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.stdout.consume(amt);
    }
}

impl Drop for ChildOutput {
    fn drop(&mut self) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        match child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}
