// SPDX-License-Identifier: MPL-2.0
//! Support report assembly.
//!
//! A [`DiagnosticReport`] is built once per collection on the worker thread
//! and never modified afterwards. [`compose_body`] renders it as the plain
//! text body of the share request; the attachment carries the log lines.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::REPORT_MIME_TYPE;
use crate::domain::diagnostics::{AppIdentity, AuxiliaryFlags, PlatformInfo, ShareRequest};

/// Line terminator of the report body.
pub const BODY_LINE_ENDING: &str = "\r\n";

// =============================================================================
// Diagnostic Report
// =============================================================================

/// Everything gathered by one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    report_id: String,
    generated_at: DateTime<Utc>,
    identity: AppIdentity,
    platform: PlatformInfo,
    flags: AuxiliaryFlags,
    log_lines: Vec<String>,
    attachment_path: Option<PathBuf>,
}

impl DiagnosticReport {
    /// Creates a report stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        identity: AppIdentity,
        platform: PlatformInfo,
        flags: AuxiliaryFlags,
        log_lines: Vec<String>,
        attachment_path: Option<PathBuf>,
    ) -> Self {
        Self {
            report_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            identity,
            platform,
            flags,
            log_lines,
            attachment_path,
        }
    }

    #[must_use]
    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    #[must_use]
    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    #[must_use]
    pub fn platform(&self) -> &PlatformInfo {
        &self.platform
    }

    #[must_use]
    pub fn flags(&self) -> &AuxiliaryFlags {
        &self.flags
    }

    /// Retained log lines, in original order.
    #[must_use]
    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    /// Where the log was written; `None` if writing failed.
    #[must_use]
    pub fn attachment_path(&self) -> Option<&Path> {
        self.attachment_path.as_deref()
    }

    /// `"{name} {version_name} logcat"`.
    #[must_use]
    pub fn subject(&self) -> String {
        format!(
            "{} {} logcat",
            self.identity.name, self.identity.version_name
        )
    }

    /// Exports the report, log lines included, as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// Body Composition
// =============================================================================

/// Renders the report body. Every line, blank ones included, ends in `\r\n`:
///
/// ```text
/// {name}: {version_name}/{version_code}
/// {os_label}: {os_release} (SDK {sdk_level})
///
/// Brand: ...            (eight device lines)
///
/// {label}: true|false   (one per flag, in order)
///
/// {prompt}
///
/// ```
#[must_use]
pub fn compose_body(report: &DiagnosticReport, prompt: &str) -> String {
    let mut body = String::new();
    let identity = &report.identity;
    let platform = &report.platform;

    push_line(
        &mut body,
        format_args!("{}: {}", identity.name, identity.version_display()),
    );
    push_line(
        &mut body,
        format_args!(
            "{}: {} (SDK {})",
            platform.os_label, platform.os_release, platform.sdk_level
        ),
    );
    body.push_str(BODY_LINE_ENDING);

    for (label, value) in platform.device_properties() {
        push_line(&mut body, format_args!("{label}: {value}"));
    }
    body.push_str(BODY_LINE_ENDING);

    for flag in report.flags.iter() {
        push_line(&mut body, format_args!("{}: {}", flag.label, flag.value));
    }
    body.push_str(BODY_LINE_ENDING);

    push_line(&mut body, format_args!("{prompt}"));
    body.push_str(BODY_LINE_ENDING);

    body
}

fn push_line(body: &mut String, line: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = body.write_fmt(line);
    body.push_str(BODY_LINE_ENDING);
}

impl ShareRequest {
    /// Builds the mail-style share of `report`.
    #[must_use]
    pub fn from_report(report: &DiagnosticReport, recipients: &[String], prompt: &str) -> Self {
        Self {
            recipients: recipients.to_vec(),
            subject: report.subject(),
            body: compose_body(report, prompt),
            attachment: report.attachment_path.clone(),
            mime_type: REPORT_MIME_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_platform() -> PlatformInfo {
        PlatformInfo {
            os_label: "Android".into(),
            brand: "google".into(),
            manufacturer: "Google".into(),
            model: "Pixel 7".into(),
            product: "panther".into(),
            device: "panther".into(),
            host: "abfarm".into(),
            display: "TQ3A.230901.001".into(),
            build_id: "TQ3A".into(),
            os_release: "13".into(),
            sdk_level: "33".into(),
        }
    }

    fn sample_report(attachment: Option<PathBuf>) -> DiagnosticReport {
        let mut flags = AuxiliaryFlags::new();
        flags.push("VPN dialogs", true);
        DiagnosticReport::new(
            AppIdentity::new("Guard", "2.1.0", 2_010_000),
            sample_platform(),
            flags,
            vec!["123 A".to_string()],
            attachment,
        )
    }

    #[test]
    fn body_has_fixed_order_and_crlf() {
        let body = compose_body(&sample_report(None), "Please describe your problem:");
        let expected = concat!(
            "Guard: 2.1.0/2010000\r\n",
            "Android: 13 (SDK 33)\r\n",
            "\r\n",
            "Brand: google\r\n",
            "Manufacturer: Google\r\n",
            "Model: Pixel 7\r\n",
            "Product: panther\r\n",
            "Device: panther\r\n",
            "Host: abfarm\r\n",
            "Display: TQ3A.230901.001\r\n",
            "Id: TQ3A\r\n",
            "\r\n",
            "VPN dialogs: true\r\n",
            "\r\n",
            "Please describe your problem:\r\n",
            "\r\n",
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn body_without_flags_keeps_group_separators() {
        let report = DiagnosticReport::new(
            AppIdentity::new("Guard", "1.0", 1),
            PlatformInfo::default(),
            AuxiliaryFlags::new(),
            Vec::new(),
            None,
        );
        let body = compose_body(&report, "?");
        assert!(body.contains("Id: unknown\r\n\r\n\r\n?\r\n\r\n"));
        assert_eq!(body.matches('\n').count(), body.matches("\r\n").count());
    }

    #[test]
    fn share_request_carries_subject_attachment_and_mime() {
        let report = sample_report(Some(PathBuf::from("/cache/logcat.txt")));
        let recipients = vec!["support@example.com".to_string()];
        let share = ShareRequest::from_report(&report, &recipients, "Describe:");

        assert_eq!(share.subject, "Guard 2.1.0 logcat");
        assert_eq!(share.mime_type, "message/rfc822");
        assert_eq!(share.recipients, recipients);
        assert_eq!(share.attachment, Some(PathBuf::from("/cache/logcat.txt")));
        assert!(share.body.ends_with("Describe:\r\n\r\n"));
    }

    #[test]
    fn missing_attachment_shares_text_only() {
        let share = ShareRequest::from_report(&sample_report(None), &[], "x");
        assert!(share.attachment.is_none());
        assert!(share.recipients.is_empty());
    }

    #[test]
    fn reports_get_distinct_ids() {
        let a = sample_report(None);
        let b = sample_report(None);
        assert_ne!(a.report_id(), b.report_id());
        assert!(Uuid::parse_str(a.report_id()).is_ok());
    }

    #[test]
    fn json_export_lists_flags_in_order() {
        let json = sample_report(None).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["identity"]["version_code"], 2_010_000);
        assert_eq!(value["flags"][0]["label"], "VPN dialogs");
        assert_eq!(value["platform"]["model"], "Pixel 7");
        assert_eq!(value["log_lines"][0], "123 A");
        assert!(value["attachment_path"].is_null());
    }

    #[test]
    fn json_export_reads_back_identically() {
        let report = sample_report(Some(PathBuf::from("/cache/logcat.txt")));
        let json = report.to_json().unwrap();
        let restored: DiagnosticReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, report);
    }
}
