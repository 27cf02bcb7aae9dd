// SPDX-License-Identifier: MPL-2.0
//! Crate-wide error type.
//!
//! Every variant is caught where it originates, logged, and turned into a
//! degraded outcome (`false`, an empty log snapshot, a missing attachment).
//! None of them crosses the verifier or collector boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the verifier, the collector and their adapters.
#[derive(Debug, Error)]
pub enum Error {
    /// Package metadata (identity, certificate, companion lookup) could not be read.
    #[error("package metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The requested digest algorithm is not supported.
    #[error("digest algorithm unavailable: {0}")]
    DigestAlgorithmUnavailable(String),

    /// The log-dump subprocess could not be started.
    #[error("failed to launch `{command}`: {source}")]
    SubprocessLaunchFailure {
        /// Program name that failed to start.
        command: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Reading the log stream failed partway.
    #[error("log stream read failed: {0}")]
    StreamReadFailure(#[source] io::Error),

    /// Creating or writing the attachment failed.
    #[error("file I/O failed for {}: {source}", path.display())]
    FileIo {
        /// File or directory that was being accessed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The presenter could not display or forward the report.
    #[error("presentation failed: {0}")]
    PresentationFailure(String),

    /// A blocking query did not finish before its deadline.
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// What was being waited on.
        operation: &'static str,
        /// The deadline that was exceeded.
        seconds: u64,
    },

    /// The collection worker panicked while building a report.
    #[error("collection worker panicked: {0}")]
    WorkerPanicked(String),

    /// Settings could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Wraps an I/O error with the path it concerns.
    pub fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
