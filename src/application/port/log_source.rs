// SPDX-License-Identifier: MPL-2.0
//! Log-source port definitions.
//!
//! A log source produces one finite, line-oriented dump of the device log per
//! call. It is not a persistent stream: every [`LogSource::open`] starts a
//! fresh dump.

use std::fmt;
use std::io::BufRead;

use crate::error::Result;

type AbortFn = Box<dyn FnOnce() + Send>;

/// One open log dump: a line stream plus an optional way to stop its producer.
pub struct LogDump {
    stream: Box<dyn BufRead + Send>,
    abort: Option<AbortFn>,
}

impl LogDump {
    /// Wraps a finite line stream.
    pub fn new(stream: impl BufRead + Send + 'static) -> Self {
        Self {
            stream: Box::new(stream),
            abort: None,
        }
    }

    /// Registers how to stop the producer if the reader gives up early
    /// (e.g. killing the dump subprocess on deadline).
    #[must_use]
    pub fn with_abort(mut self, abort: impl FnOnce() + Send + 'static) -> Self {
        self.abort = Some(Box::new(abort));
        self
    }

    /// Splits into the stream and the abort hook.
    pub fn into_parts(self) -> (Box<dyn BufRead + Send>, Option<AbortFn>) {
        (self.stream, self.abort)
    }
}

impl fmt::Debug for LogDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogDump")
            .field("abortable", &self.abort.is_some())
            .finish_non_exhaustive()
    }
}

/// Produces one-shot dumps of the buffered device log.
pub trait LogSource: Send + Sync {
    /// Starts a dump.
    ///
    /// # Errors
    ///
    /// Returns `Error::SubprocessLaunchFailure` if the producer cannot start.
    fn open(&self) -> Result<LogDump>;
}
