// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Log capture**: Log-dump command and read deadline
//! - **Metadata**: Package-metadata query deadline
//! - **Report**: Prompt text and companion-package checks
//! - **Integrity**: Digest algorithm

use crate::domain::diagnostics::{metadata_timeout_bounds, read_timeout_bounds};

// ==========================================================================
// Log Capture Defaults
// ==========================================================================

/// One-shot dump of the buffered device log with thread/time formatting.
pub const DEFAULT_LOG_COMMAND: &[&str] = &["logcat", "-d", "-v", "threadtime"];

/// Default deadline for reading the log dump (in seconds).
pub const DEFAULT_LOG_READ_TIMEOUT_SECS: u64 = read_timeout_bounds::DEFAULT;

/// File name of the log attachment inside the cache directory.
pub const LOG_FILE_NAME: &str = "logcat.txt";

// ==========================================================================
// Metadata Defaults
// ==========================================================================

/// Default deadline for a single package-metadata query (in seconds).
pub const DEFAULT_METADATA_TIMEOUT_SECS: u64 = metadata_timeout_bounds::DEFAULT;

// ==========================================================================
// Report Defaults
// ==========================================================================

/// Closing prompt appended to the report body.
pub const DEFAULT_REPORT_PROMPT: &str = "Please describe your problem:";

/// Label of the default companion-package check.
pub const DEFAULT_COMPANION_LABEL: &str = "VPN dialogs";

/// Package probed by the default companion-package check.
pub const DEFAULT_COMPANION_PACKAGE: &str = "com.android.vpndialogs";

/// MIME type handed to the presenter for the composed report.
pub const REPORT_MIME_TYPE: &str = "message/rfc822";

// ==========================================================================
// Integrity Defaults
// ==========================================================================

/// Digest used for the signing-certificate fingerprint.
pub const DEFAULT_FINGERPRINT_ALGORITHM: &str = "sha1";
