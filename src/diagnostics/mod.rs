// SPDX-License-Identifier: MPL-2.0
//! Support-report collection.
//!
//! # Architecture
//!
//! - [`DiagnosticsCollector`]: foreground owner of a worker thread that builds
//!   reports and of the presenter that shows them
//! - [`log_retriever`]: one-shot log dump filtered to this process
//! - [`export`]: writes the CRLF log attachment into the cache directory
//! - [`report`]: the immutable [`DiagnosticReport`] and its mail body
//!
//! Collection never fails outright except when the app's own identity cannot
//! be read. Every other problem degrades the report (a flag reads `false`,
//! the log is partial, the attachment is missing) and is logged.

mod collector;
pub mod export;
pub mod log_retriever;
pub mod report;

pub use collector::{
    collect_report, CollectionOutcome, CollectionSettings, CollectionState, CollectionTicket,
    CollectorServices, Completion, DiagnosticsCollector, PreparedReport,
};
pub use export::{make_world_readable, write_log_attachment};
pub use log_retriever::{filter_lines, retrieve_own_process_log, retrieve_process_log};
pub use report::{compose_body, DiagnosticReport};
