// SPDX-License-Identifier: MPL-2.0
//! Adapters implementing the [`BuildPropertySource`] port.
//!
//! - [`SystemBuildProperties`]: desktop hosts, read through `sysinfo`
//! - [`GetpropBuildProperties`]: Android hosts, parsed from `getprop` output
//!
//! Both map anything the host does not report to
//! [`UNKNOWN_PROPERTY`].
//!
//! [`BuildPropertySource`]: crate::application::port::BuildPropertySource

use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::sync::Arc;

use sysinfo::System;

use crate::application::port::BuildPropertySource;
use crate::domain::diagnostics::{PlatformInfo, UNKNOWN_PROPERTY};

fn known(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_PROPERTY.to_string())
}

// =============================================================================
// Desktop
// =============================================================================

/// Build properties of a desktop host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBuildProperties;

impl BuildPropertySource for SystemBuildProperties {
    fn snapshot(&self) -> PlatformInfo {
        let sys = System::new_all();
        let cpu = sys.cpus().first();

        PlatformInfo {
            os_label: known(System::name()),
            brand: known(Some(System::distribution_id())),
            manufacturer: known(cpu.map(|c| c.vendor_id().to_string())),
            model: known(cpu.map(|c| c.brand().to_string())),
            product: std::env::consts::OS.to_string(),
            device: std::env::consts::ARCH.to_string(),
            host: known(System::host_name()),
            display: known(System::long_os_version()),
            build_id: known(System::kernel_version()),
            os_release: known(System::os_version()),
            sdk_level: UNKNOWN_PROPERTY.to_string(),
        }
    }
}

// =============================================================================
// Android
// =============================================================================

/// Build properties read from the Android property service.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetpropBuildProperties;

impl BuildPropertySource for GetpropBuildProperties {
    fn snapshot(&self) -> PlatformInfo {
        let output = Command::new("getprop")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(output) => platform_from_props(&parse_getprop(&String::from_utf8_lossy(
                &output.stdout,
            ))),
            Err(err) => {
                tracing::warn!(error = %err, "getprop unavailable, build properties unknown");
                PlatformInfo {
                    os_label: "Android".to_string(),
                    ..PlatformInfo::default()
                }
            }
        }
    }
}

/// Parses `getprop` output, one `[key]: [value]` pair per line. Lines that
/// do not have that shape are skipped.
#[must_use]
pub fn parse_getprop(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once("]: [")?;
            let key = key.strip_prefix('[')?;
            let value = value.strip_suffix(']')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Maps Android system properties onto [`PlatformInfo`].
#[must_use]
pub fn platform_from_props(props: &HashMap<String, String>) -> PlatformInfo {
    let get = |key: &str| known(props.get(key).cloned());
    PlatformInfo {
        os_label: "Android".to_string(),
        brand: get("ro.product.brand"),
        manufacturer: get("ro.product.manufacturer"),
        model: get("ro.product.model"),
        product: get("ro.product.name"),
        device: get("ro.product.device"),
        host: get("ro.build.host"),
        display: get("ro.build.display.id"),
        build_id: get("ro.build.id"),
        os_release: get("ro.build.version.release"),
        sdk_level: get("ro.build.version.sdk"),
    }
}

/// The property source suited to the compile target.
#[must_use]
pub fn default_build_properties() -> Arc<dyn BuildPropertySource> {
    if cfg!(target_os = "android") {
        Arc::new(GetpropBuildProperties)
    } else {
        Arc::new(SystemBuildProperties)
    }
}
