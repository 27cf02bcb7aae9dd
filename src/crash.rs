// SPDX-License-Identifier: MPL-2.0
//! Crash reports built from panics.
//!
//! [`install_panic_hook`] records every panic as a JSON [`CrashReport`] in the
//! cache directory, next to the log attachment, then runs the previously
//! installed hook. Panics raised inside [`catch_contained`] are turned into
//! errors by their caller and are not recorded. A stored report can later be
//! turned into a [`ShareRequest`] and handed to the same presenter as support
//! reports.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::fs;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::config::REPORT_MIME_TYPE;
use crate::domain::diagnostics::ShareRequest;
use crate::error::{Error, Result};

/// Value of [`CrashReport::kind`].
pub const CRASH_KIND: &str = "crash";

thread_local! {
    /// Depth of [`catch_contained`] scopes active on this thread.
    static CONTAINED: Cell<u32> = const { Cell::new(0) };
}

/// Structured description of one panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashReport {
    pub package_name: String,
    /// Executable name of the crashing process.
    pub process_name: String,
    pub time: DateTime<Utc>,
    pub kind: String,
    pub exception_type: String,
    pub message: String,
    pub stack_trace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw_column: Option<u32>,
    /// Name of the panicking thread, `<unnamed>` if it has none.
    pub thread: String,
}

/// Where a panic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanicLocation<'a> {
    pub file: &'a str,
    pub line: u32,
    pub column: u32,
}

impl CrashReport {
    /// Builds a report from already-extracted panic details.
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        message: impl Into<String>,
        location: Option<PanicLocation<'_>>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            process_name: process_name(),
            time: Utc::now(),
            kind: CRASH_KIND.to_string(),
            exception_type: "panic".to_string(),
            message: message.into(),
            stack_trace: stack_trace.into(),
            throw_file: location.map(|l| l.file.to_string()),
            throw_line: location.map(|l| l.line),
            throw_column: location.map(|l| l.column),
            thread: std::thread::current()
                .name()
                .unwrap_or("<unnamed>")
                .to_string(),
        }
    }

    /// Builds a report from the information passed to a panic hook.
    #[must_use]
    pub fn from_panic(package_name: &str, info: &PanicHookInfo<'_>) -> Self {
        let location = info.location().map(|l| PanicLocation {
            file: l.file(),
            line: l.line(),
            column: l.column(),
        });
        Self::new(
            package_name,
            panic_message(info.payload()),
            location,
            Backtrace::force_capture().to_string(),
        )
    }

    /// `crash-YYYYMMDD_HHMMSS.json`, in local time.
    #[must_use]
    pub fn file_name(&self) -> String {
        let local: DateTime<Local> = self.time.into();
        format!("crash-{}.json", local.format("%Y%m%d_%H%M%S"))
    }

    /// Writes the report as pretty JSON into `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileIo` if the directory or file cannot be written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|err| Error::file_io(dir, err))?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| Error::Config(format!("cannot serialize crash report: {err}")))?;
        fs::write(&path, json).map_err(|err| Error::file_io(&path, err))?;
        Ok(path)
    }

    /// Reads a report written by [`Self::write_to_dir`].
    ///
    /// # Errors
    ///
    /// Returns `Error::FileIo` if the file cannot be read and `Error::Config`
    /// if it is not a crash report.
    pub fn read_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| Error::file_io(path, err))?;
        serde_json::from_str(&raw)
            .map_err(|err| Error::Config(format!("invalid crash report {}: {err}", path.display())))
    }

    /// A share request carrying the report, with the JSON file attached when
    /// `attachment` is given.
    #[must_use]
    pub fn to_share_request(&self, recipients: &[String], attachment: Option<PathBuf>) -> ShareRequest {
        let mut body = format!(
            "{} crashed on thread '{}' at {}\r\n",
            self.package_name,
            self.thread,
            self.time.to_rfc3339()
        );
        if let (Some(file), Some(line)) = (&self.throw_file, self.throw_line) {
            body.push_str(&format!("{file}:{line}\r\n"));
        }
        body.push_str("\r\n");
        body.push_str(&self.message);
        body.push_str("\r\n");

        ShareRequest {
            recipients: recipients.to_vec(),
            subject: format!("{} crash report", self.package_name),
            body,
            attachment,
            mime_type: REPORT_MIME_TYPE.to_string(),
        }
    }
}

/// The most recent `crash-*.json` in `dir`, if any.
///
/// File names embed their timestamp, so the newest report sorts last.
///
/// # Errors
///
/// Returns `Error::FileIo` if `dir` exists but cannot be listed.
pub fn newest_report_in(dir: &Path) -> Result<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::file_io(dir, err)),
    };
    let newest = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("crash-") && name.ends_with(".json"))
        })
        .max();
    Ok(newest)
}

/// Installs a hook that writes a [`CrashReport`] into `dir` on every panic,
/// then defers to the hook that was installed before.
pub fn install_panic_hook(package_name: impl Into<String>, dir: PathBuf) {
    let package_name = package_name.into();
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if panic_is_contained() {
            tracing::debug!(
                message = %panic_message(info.payload()),
                "contained panic, not recorded"
            );
            return;
        }
        let report = CrashReport::from_panic(&package_name, info);
        match report.write_to_dir(&dir) {
            Ok(path) => tracing::error!(
                path = %path.display(),
                message = %report.message,
                "panic recorded as crash report"
            ),
            Err(err) => tracing::error!(error = %err, "failed to record crash report"),
        }
        previous(info);
    }));
}

/// Runs `f`, turning a panic into `Err` with its message.
///
/// The crash hook ignores panics raised on this thread while `f` runs.
pub fn catch_contained<R>(f: impl FnOnce() -> R) -> std::result::Result<R, String> {
    CONTAINED.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINED.with(|depth| depth.set(depth.get() - 1));
    result.map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_is_contained() -> bool {
    CONTAINED.try_with(|depth| depth.get() > 0).unwrap_or(false)
}

/// Extracts the message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
