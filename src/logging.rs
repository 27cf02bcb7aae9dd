// SPDX-License-Identifier: MPL-2.0
//! Diagnostic logging setup and the shared failure logger.
//!
//! All components report problems through [`log_failure`], which records the
//! error, its source chain and a backtrace. The backtrace is captured
//! whether or not `RUST_BACKTRACE` is set.

use std::backtrace::Backtrace;
use std::error::Error as StdError;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug`, and the
/// default level is `warn`. Logs go to stderr so stdout stays reserved for
/// command output. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

/// Logs an error with its full source chain and a stack trace.
pub fn log_failure(context: &str, err: &(dyn StdError + 'static)) {
    let chain = error_chain(err);
    let message = failure_message(context, &Backtrace::force_capture());
    tracing::error!(context, error = %chain, "{message}");
}

fn failure_message(context: &str, backtrace: &Backtrace) -> String {
    format!("{context} failed\n{backtrace}")
}

/// Renders `err` and all of its sources as `outer: inner: root`.
#[must_use]
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        rendered.push_str(": ");
        rendered.push_str(&source.to_string());
        current = source.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::backtrace::BacktraceStatus;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = Error::StreamReadFailure(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        let chain = error_chain(&err);
        assert!(chain.starts_with("log stream read failed"));
        assert!(chain.ends_with("pipe closed"));
    }

    #[test]
    fn log_failure_does_not_panic_without_subscriber() {
        let err = Error::PresentationFailure("no handler".to_string());
        log_failure("presenting report", &err);
    }

    #[test]
    fn failure_message_always_has_frames() {
        let backtrace = Backtrace::force_capture();
        assert_eq!(backtrace.status(), BacktraceStatus::Captured);

        let message = failure_message("reading log", &backtrace);
        assert!(message.starts_with("reading log failed\n"));
        assert!(!message.contains("disabled backtrace"));
        assert!(message.lines().count() > 1);
    }

    #[test]
    fn log_failure_writes_chain_and_backtrace() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let err = Error::StreamReadFailure(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        tracing::subscriber::with_default(subscriber, || log_failure("reading log", &err));

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("reading log failed"));
        assert!(output.contains("pipe closed"));
        assert!(!output.contains("disabled backtrace"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
