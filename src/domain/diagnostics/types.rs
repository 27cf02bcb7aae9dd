// SPDX-License-Identifier: MPL-2.0
//! Value objects gathered into a support report.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder for a build property the host does not expose.
pub const UNKNOWN_PROPERTY: &str = "unknown";

/// Application name plus version, read once per report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    pub name: String,
    pub version_name: String,
    /// Build number.
    pub version_code: u64,
}

impl AppIdentity {
    #[must_use]
    pub fn new(name: impl Into<String>, version_name: impl Into<String>, version_code: u64) -> Self {
        Self {
            name: name.into(),
            version_name: version_name.into(),
            version_code,
        }
    }

    /// `"{version_name}/{version_code}"`, as printed in the identity line.
    #[must_use]
    pub fn version_display(&self) -> String {
        format!("{}/{}", self.version_name, self.version_code)
    }
}

/// Static build properties of the host, captured at collection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Name printed before the OS release (e.g. "Android", "Linux").
    pub os_label: String,
    pub brand: String,
    pub manufacturer: String,
    pub model: String,
    pub product: String,
    pub device: String,
    pub host: String,
    /// Human-readable build display string.
    pub display: String,
    pub build_id: String,
    pub os_release: String,
    pub sdk_level: String,
}

impl Default for PlatformInfo {
    fn default() -> Self {
        let unknown = || UNKNOWN_PROPERTY.to_string();
        Self {
            os_label: unknown(),
            brand: unknown(),
            manufacturer: unknown(),
            model: unknown(),
            product: unknown(),
            device: unknown(),
            host: unknown(),
            display: unknown(),
            build_id: unknown(),
            os_release: unknown(),
            sdk_level: unknown(),
        }
    }
}

impl PlatformInfo {
    /// The eight device-property lines of the report body, in body order.
    #[must_use]
    pub fn device_properties(&self) -> [(&'static str, &str); 8] {
        [
            ("Brand", self.brand.as_str()),
            ("Manufacturer", self.manufacturer.as_str()),
            ("Model", self.model.as_str()),
            ("Product", self.product.as_str()),
            ("Device", self.device.as_str()),
            ("Host", self.host.as_str()),
            ("Display", self.display.as_str()),
            ("Id", self.build_id.as_str()),
        ]
    }
}

/// Result of one named boolean check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryFlag {
    pub label: String,
    pub value: bool,
}

/// Ordered named checks; order is preserved in the report body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuxiliaryFlags(Vec<AuxiliaryFlag>);

impl AuxiliaryFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: bool) {
        self.0.push(AuxiliaryFlag {
            label: label.into(),
            value,
        });
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<bool> {
        self.0.iter().find(|f| f.label == label).map(|f| f.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuxiliaryFlag> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the presenter receives: a mail-style share of the composed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequest {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    /// Log attachment; `None` when the attachment could not be written.
    #[serde(default)]
    pub attachment: Option<PathBuf>,
    pub mime_type: String,
}
