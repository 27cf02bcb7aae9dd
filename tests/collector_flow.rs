// SPDX-License-Identifier: MPL-2.0
//! End-to-end collection with in-memory ports.

use std::cell::RefCell;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use selfcheck::application::port::{
    BuildPropertySource, LogDump, LogSource, PackageError, PackageMetadata, Presenter,
};
use selfcheck::config::{CompanionPackage, LOG_FILE_NAME};
use selfcheck::diagnostics::{
    CollectionSettings, CollectionState, CollectorServices, DiagnosticsCollector,
};
use selfcheck::domain::diagnostics::{
    AppIdentity, MetadataTimeout, PlatformInfo, ReadTimeout, ShareRequest,
};
use selfcheck::error::{Error, Result};
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(15);

// =============================================================================
// Fakes
// =============================================================================

struct FakePackage {
    identity_fails: bool,
}

impl PackageMetadata for FakePackage {
    fn own_identity(&self) -> std::result::Result<AppIdentity, PackageError> {
        if self.identity_fails {
            Err(PackageError::NotFound("com.example.guard".into()))
        } else {
            Ok(AppIdentity::new("Guard", "2.1.0", 2_010_000))
        }
    }

    fn own_signing_certificate(&self) -> std::result::Result<Vec<u8>, PackageError> {
        Ok(b"abc".to_vec())
    }

    fn is_package_installed(&self, name: &str) -> std::result::Result<bool, PackageError> {
        Ok(name == "com.android.vpndialogs")
    }
}

struct FakePlatform;

impl BuildPropertySource for FakePlatform {
    fn snapshot(&self) -> PlatformInfo {
        PlatformInfo {
            os_label: "Android".into(),
            brand: "google".into(),
            manufacturer: "Google".into(),
            model: "Pixel 7".into(),
            product: "panther".into(),
            device: "panther".into(),
            host: "abfarm".into(),
            display: "TQ3A".into(),
            build_id: "TQ3A".into(),
            os_release: "13".into(),
            sdk_level: "33".into(),
        }
    }
}

/// Serves a dump of this process's lines between logcat section banners,
/// which carry no digits and so never match a pid.
struct FakeLog {
    opened: Arc<AtomicUsize>,
}

impl LogSource for FakeLog {
    fn open(&self) -> Result<LogDump> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        let dump = format!(
            "--------- beginning of main\n\
             01-01 10:00:00.000 {pid} {pid} I Guard: started\n\
             --------- beginning of system\n\
             01-01 10:00:00.002 {pid} {pid} W Guard: low memory\n"
        );
        Ok(LogDump::new(Cursor::new(dump.into_bytes())))
    }
}

#[derive(Clone, Default)]
struct RecordingPresenter(Rc<RefCell<Vec<ShareRequest>>>);

impl Presenter for RecordingPresenter {
    fn present(&mut self, request: &ShareRequest) -> Result<()> {
        self.0.borrow_mut().push(request.clone());
        Ok(())
    }
}

fn services(identity_fails: bool, opened: &Arc<AtomicUsize>) -> CollectorServices {
    CollectorServices {
        package: Arc::new(FakePackage { identity_fails }),
        platform: Arc::new(FakePlatform),
        log_source: Arc::new(FakeLog {
            opened: Arc::clone(opened),
        }),
    }
}

fn settings(output_dir: Option<PathBuf>) -> CollectionSettings {
    CollectionSettings {
        recipients: vec!["support@example.com".into()],
        prompt: "Please describe your problem:".into(),
        companion_packages: vec![CompanionPackage {
            label: "VPN dialogs".into(),
            package: "com.android.vpndialogs".into(),
        }],
        output_dir,
        log_file_name: LOG_FILE_NAME.into(),
        log_read_timeout: ReadTimeout::default(),
        metadata_timeout: MetadataTimeout::default(),
    }
}

// =============================================================================
// Flows
// =============================================================================

#[test]
fn successful_collection_is_presented_with_attachment() {
    let dir = tempdir().expect("failed to create temp dir");
    let opened = Arc::new(AtomicUsize::new(0));
    let presenter = RecordingPresenter::default();
    let mut collector = DiagnosticsCollector::new(
        services(false, &opened),
        settings(Some(dir.path().to_path_buf())),
        Box::new(presenter.clone()),
    );

    collector.request();
    let completion = collector.wait_and_present(WAIT).expect("collection outcome");
    assert_eq!(completion.state, CollectionState::Presented);

    let shared = presenter.0.borrow();
    assert_eq!(shared.len(), 1);
    let share = &shared[0];
    assert_eq!(share.subject, "Guard 2.1.0 logcat");
    assert_eq!(share.mime_type, "message/rfc822");
    assert_eq!(share.recipients, vec!["support@example.com".to_string()]);
    assert!(share.body.starts_with("Guard: 2.1.0/2010000\r\nAndroid: 13 (SDK 33)\r\n\r\nBrand: google\r\n"));
    assert!(share.body.contains("Id: TQ3A\r\n\r\nVPN dialogs: true\r\n\r\nPlease describe your problem:\r\n\r\n"));

    let attachment = share.attachment.as_ref().expect("attachment");
    let contents = fs::read_to_string(attachment).unwrap();
    let lines: Vec<&str> = contents.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("Guard: started"));
    assert!(lines[1].ends_with("Guard: low memory"));
    assert!(!contents.contains("beginning of"));
}

#[test]
fn attachment_write_failure_still_presents_text_only() {
    let dir = tempdir().expect("failed to create temp dir");
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, b"not a directory").unwrap();

    let opened = Arc::new(AtomicUsize::new(0));
    let presenter = RecordingPresenter::default();
    let mut collector = DiagnosticsCollector::new(
        services(false, &opened),
        settings(Some(blocker)),
        Box::new(presenter.clone()),
    );

    collector.request();
    let completion = collector.wait_and_present(WAIT).expect("collection outcome");

    assert_eq!(completion.state, CollectionState::Presented);
    let shared = presenter.0.borrow();
    assert_eq!(shared.len(), 1);
    assert!(shared[0].attachment.is_none());
    assert!(!shared[0].body.is_empty());
    assert_eq!(
        collector.last_report().map(|r| r.log_lines().len()),
        Some(2)
    );
}

#[test]
fn identity_failure_never_reaches_presenter() {
    let opened = Arc::new(AtomicUsize::new(0));
    let presenter = RecordingPresenter::default();
    let mut collector = DiagnosticsCollector::new(
        services(true, &opened),
        settings(None),
        Box::new(presenter.clone()),
    );

    collector.request();
    let completion = collector.wait_and_present(WAIT).expect("collection outcome");

    assert_eq!(completion.state, CollectionState::Failed);
    assert_eq!(collector.state(), CollectionState::Failed);
    assert!(presenter.0.borrow().is_empty());
    // Collection stops before the log is dumped.
    assert_eq!(opened.load(Ordering::SeqCst), 0);
}

#[test]
fn presenter_runs_only_when_owner_processes_outcomes() {
    let opened = Arc::new(AtomicUsize::new(0));
    let presenter = RecordingPresenter::default();
    let mut collector = DiagnosticsCollector::new(
        services(false, &opened),
        settings(None),
        Box::new(presenter.clone()),
    );

    collector.request();
    while opened.load(Ordering::SeqCst) == 0 {
        std::thread::sleep(Duration::from_millis(5));
    }
    std::thread::sleep(Duration::from_millis(200));
    assert!(presenter.0.borrow().is_empty());

    let mut completions = collector.process_pending();
    while completions.is_empty() {
        std::thread::sleep(Duration::from_millis(10));
        completions = collector.process_pending();
    }
    assert_eq!(completions.len(), 1);
    assert_eq!(presenter.0.borrow().len(), 1);
}

#[test]
fn every_request_is_collected_once() {
    let dir = tempdir().expect("failed to create temp dir");
    let opened = Arc::new(AtomicUsize::new(0));
    let presenter = RecordingPresenter::default();
    let mut collector = DiagnosticsCollector::new(
        services(false, &opened),
        settings(Some(dir.path().to_path_buf())),
        Box::new(presenter.clone()),
    );

    let tickets: Vec<_> = (0..3).map(|_| collector.request()).collect();
    let mut seen = Vec::new();
    while let Some(completion) = collector.wait_and_present(WAIT) {
        seen.push(completion.ticket);
    }

    assert_eq!(seen, tickets);
    assert_eq!(opened.load(Ordering::SeqCst), 3);
    assert_eq!(presenter.0.borrow().len(), 3);
    assert_eq!(collector.pending(), 0);

    let attachment = dir.path().join(LOG_FILE_NAME);
    assert_eq!(
        fs::read_to_string(attachment).unwrap().matches("\r\n").count(),
        2
    );
}

#[test]
fn presentation_failure_is_contained() {
    struct Failing;

    impl Presenter for Failing {
        fn present(&mut self, _request: &ShareRequest) -> Result<()> {
            Err(Error::PresentationFailure("no mail client".into()))
        }
    }

    let opened = Arc::new(AtomicUsize::new(0));
    let mut collector =
        DiagnosticsCollector::new(services(false, &opened), settings(None), Box::new(Failing));

    collector.request();
    let completion = collector.wait_and_present(WAIT).expect("collection outcome");
    assert_eq!(completion.state, CollectionState::Ready);
}
