// SPDX-License-Identifier: MPL-2.0
//! Two-phase diagnostics collection.
//!
//! The owner (the foreground thread) calls [`DiagnosticsCollector::request`].
//! A dedicated worker thread gathers the report in the background: identity,
//! platform properties, companion-package flags, the process log, and the
//! attachment file. Finished outcomes travel back over a channel and are
//! handed to the [`Presenter`] only when the owner calls
//! [`DiagnosticsCollector::process_pending`] (or `wait_and_present`), so the
//! presenter never runs off the foreground thread.
//!
//! Requests queue on the single worker and run one at a time. Two triggers in
//! quick succession therefore never write the attachment concurrently.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use super::export::{make_world_readable, write_log_attachment};
use super::log_retriever::retrieve_own_process_log;
use super::report::DiagnosticReport;
use crate::application::port::{BuildPropertySource, LogSource, PackageMetadata, Presenter};
use crate::config::{CompanionPackage, Config, LOG_FILE_NAME};
use crate::crash::catch_contained;
use crate::domain::diagnostics::{
    AuxiliaryFlags, MetadataTimeout, ReadTimeout, ShareRequest,
};
use crate::error::{Error, Result};
use crate::logging::log_failure;

// =============================================================================
// Services and Settings
// =============================================================================

/// The ports a collection reads from.
#[derive(Clone)]
pub struct CollectorServices {
    pub package: Arc<dyn PackageMetadata>,
    pub platform: Arc<dyn BuildPropertySource>,
    pub log_source: Arc<dyn LogSource>,
}

impl fmt::Debug for CollectorServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectorServices").finish_non_exhaustive()
    }
}

/// Per-collection settings, resolved from [`Config`] once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSettings {
    /// Addressees of the share request.
    pub recipients: Vec<String>,
    /// Closing line of the body asking the user to describe the problem.
    pub prompt: String,
    /// Packages probed for the auxiliary flags, in body order.
    pub companion_packages: Vec<CompanionPackage>,
    /// Where the attachment is written; `None` disables the attachment.
    pub output_dir: Option<PathBuf>,
    pub log_file_name: String,
    pub log_read_timeout: ReadTimeout,
    pub metadata_timeout: MetadataTimeout,
}

impl CollectionSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            recipients: config.support_recipients.clone(),
            prompt: config.report_prompt().to_string(),
            companion_packages: config.companion_packages.clone(),
            output_dir: config.output_dir(),
            log_file_name: LOG_FILE_NAME.to_string(),
            log_read_timeout: config.log_read_timeout(),
            metadata_timeout: config.metadata_timeout(),
        }
    }
}

// =============================================================================
// State and Outcomes
// =============================================================================

/// Lifecycle of the most recently requested collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionState {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A collection is queued or running on the worker.
    Collecting,
    /// The report was built but the presenter rejected it.
    Ready,
    /// The report could not be built; nothing was presented.
    Failed,
    /// The report was handed to the presenter.
    Presented,
}

/// Identifies one call to [`DiagnosticsCollector::request`]. Monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionTicket(u64);

impl CollectionTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CollectionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A built report together with its share request.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub report: DiagnosticReport,
    pub share: ShareRequest,
}

/// What the worker sends back for each ticket.
#[derive(Debug)]
pub enum CollectionOutcome {
    Ready {
        ticket: CollectionTicket,
        prepared: Box<PreparedReport>,
    },
    Failed {
        ticket: CollectionTicket,
        error: Error,
    },
}

/// How one ticket ended, as seen by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub ticket: CollectionTicket,
    pub state: CollectionState,
}

// =============================================================================
// Background Phase
// =============================================================================

/// Runs every background step for one collection, synchronously.
///
/// Only an identity failure aborts the collection. Companion lookups that
/// fail count as absent, and a failed attachment write leaves the report
/// without an attachment.
///
/// # Errors
///
/// Returns the identity query error (including its timeout).
pub fn collect_report(
    services: &CollectorServices,
    settings: &CollectionSettings,
) -> Result<PreparedReport> {
    let package = Arc::clone(&services.package);
    let identity = with_deadline("identity query", settings.metadata_timeout, move || {
        package.own_identity().map_err(Error::from)
    })?;

    let platform = services.platform.snapshot();

    let mut flags = AuxiliaryFlags::new();
    for companion in &settings.companion_packages {
        let package = Arc::clone(&services.package);
        let name = companion.package.clone();
        let installed = with_deadline("package lookup", settings.metadata_timeout, move || {
            package.is_package_installed(&name).map_err(Error::from)
        })
        .unwrap_or_else(|err| {
            log_failure(&format!("looking up {}", companion.package), &err);
            false
        });
        flags.push(companion.label.clone(), installed);
    }

    let log_lines = retrieve_own_process_log(services.log_source.as_ref(), settings.log_read_timeout);

    let attachment_path = write_attachment(settings, &log_lines);

    let report = DiagnosticReport::new(identity, platform, flags, log_lines, attachment_path);
    let share = ShareRequest::from_report(&report, &settings.recipients, &settings.prompt);
    Ok(PreparedReport { report, share })
}

fn write_attachment(settings: &CollectionSettings, lines: &[String]) -> Option<PathBuf> {
    let Some(dir) = settings.output_dir.as_deref() else {
        tracing::warn!("no cache directory available, sharing report without attachment");
        return None;
    };

    let path = match write_log_attachment(dir, &settings.log_file_name, lines) {
        Ok(path) => path,
        Err(err) => {
            log_failure("writing log attachment", &err);
            return None;
        }
    };

    if let Err(err) = make_world_readable(&path) {
        log_failure("granting read access to log attachment", &err);
    }
    Some(path)
}

/// Runs a blocking metadata query on a helper thread and gives up after
/// `timeout`. A query that never returns leaves its helper thread behind.
fn with_deadline<T, F>(operation: &'static str, timeout: MetadataTimeout, query: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (result_tx, result_rx) = bounded(1);
    thread::Builder::new()
        .name(operation.replace(' ', "-"))
        .spawn(move || {
            let result = catch_contained(query).unwrap_or_else(|message| {
                Err(Error::MetadataUnavailable(format!("{operation} panicked: {message}")))
            });
            let _ = result_tx.send(result);
        })
        .map_err(|err| Error::MetadataUnavailable(format!("cannot start {operation}: {err}")))?;

    match result_rx.recv_timeout(timeout.as_duration()) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(Error::Timeout {
            operation,
            seconds: timeout.value(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(Error::MetadataUnavailable(format!(
            "{operation} ended without an answer"
        ))),
    }
}

fn worker_loop(
    services: &CollectorServices,
    settings: &CollectionSettings,
    request_rx: &Receiver<CollectionTicket>,
    outcome_tx: &Sender<CollectionOutcome>,
    stop: &AtomicBool,
) {
    for ticket in request_rx.iter() {
        if stop.load(Ordering::Acquire) {
            tracing::debug!(%ticket, "collector dropped, skipping queued collection");
            continue;
        }
        tracing::info!(%ticket, "collecting diagnostics");
        let result = catch_contained(|| collect_report(services, settings))
            .unwrap_or_else(|message| Err(Error::WorkerPanicked(message)));

        let outcome = match result {
            Ok(prepared) => CollectionOutcome::Ready {
                ticket,
                prepared: Box::new(prepared),
            },
            Err(error) => CollectionOutcome::Failed { ticket, error },
        };
        if outcome_tx.send(outcome).is_err() {
            break;
        }
    }
    tracing::debug!("diagnostics worker stopped");
}

// =============================================================================
// Foreground Owner
// =============================================================================

/// Owns the worker thread and the presenter.
///
/// Not `Send` when the presenter is not; keep it on the thread that presents.
pub struct DiagnosticsCollector {
    request_tx: Option<Sender<CollectionTicket>>,
    outcome_rx: Receiver<CollectionOutcome>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    presenter: Box<dyn Presenter>,
    state: CollectionState,
    next_ticket: u64,
    pending: usize,
    last_report: Option<DiagnosticReport>,
}

impl DiagnosticsCollector {
    /// Starts the worker thread. Nothing is collected until [`Self::request`].
    #[must_use]
    pub fn new(
        services: CollectorServices,
        settings: CollectionSettings,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        let (request_tx, request_rx) = unbounded::<CollectionTicket>();
        let (outcome_tx, outcome_rx) = unbounded::<CollectionOutcome>();

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let worker = thread::spawn(move || {
            worker_loop(&services, &settings, &request_rx, &outcome_tx, &worker_stop);
        });

        Self {
            request_tx: Some(request_tx),
            outcome_rx,
            worker: Some(worker),
            stop,
            presenter,
            state: CollectionState::Idle,
            next_ticket: 0,
            pending: 0,
            last_report: None,
        }
    }

    /// Queues a collection and returns immediately.
    pub fn request(&mut self) -> CollectionTicket {
        self.next_ticket += 1;
        let ticket = CollectionTicket(self.next_ticket);

        let queued = self
            .request_tx
            .as_ref()
            .is_some_and(|tx| tx.send(ticket).is_ok());
        if queued {
            self.pending += 1;
            self.state = CollectionState::Collecting;
            tracing::debug!(%ticket, pending = self.pending, "diagnostics collection queued");
        } else {
            tracing::error!(%ticket, "diagnostics worker is not running");
            self.state = CollectionState::Failed;
        }
        ticket
    }

    /// Presents every outcome that has arrived, without blocking.
    pub fn process_pending(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            completions.push(self.finish(outcome));
        }
        completions
    }

    /// Blocks for at most `timeout` until the next outcome arrives, then
    /// presents it. `None` if nothing is pending or the wait timed out.
    pub fn wait_and_present(&mut self, timeout: Duration) -> Option<Completion> {
        if self.pending == 0 {
            return None;
        }
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "no diagnostics outcome before timeout"
                );
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::error!("diagnostics worker exited with collections pending");
                self.pending = 0;
                self.state = CollectionState::Failed;
                None
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> CollectionState {
        self.state
    }

    /// Number of requested collections whose outcome has not been handled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// The last report that reached the foreground, presented or not.
    #[must_use]
    pub fn last_report(&self) -> Option<&DiagnosticReport> {
        self.last_report.as_ref()
    }

    fn finish(&mut self, outcome: CollectionOutcome) -> Completion {
        self.pending = self.pending.saturating_sub(1);

        let (ticket, state) = match outcome {
            CollectionOutcome::Ready { ticket, prepared } => {
                let PreparedReport { report, share } = *prepared;
                let state = match self.presenter.present(&share) {
                    Ok(()) => {
                        tracing::info!(
                            %ticket,
                            report_id = report.report_id(),
                            attached = share.attachment.is_some(),
                            "diagnostics report presented"
                        );
                        CollectionState::Presented
                    }
                    Err(err) => {
                        log_failure("presenting diagnostics report", &err);
                        CollectionState::Ready
                    }
                };
                self.last_report = Some(report);
                (ticket, state)
            }
            CollectionOutcome::Failed { ticket, error } => {
                log_failure("collecting diagnostics", &error);
                (ticket, CollectionState::Failed)
            }
        };

        self.state = if self.pending > 0 {
            CollectionState::Collecting
        } else {
            state
        };
        Completion { ticket, state }
    }
}

impl fmt::Debug for DiagnosticsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsCollector")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Drop for DiagnosticsCollector {
    fn drop(&mut self) {
        // Queued tickets are skipped; only a collection already running is
        // waited for.
        self.stop.store(true, Ordering::Release);
        self.request_tx.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
