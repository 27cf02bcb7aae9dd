// SPDX-License-Identifier: MPL-2.0
//! Host adapter implementing the [`PackageMetadata`] port.
//!
//! The running build's identity comes from settings (falling back to the
//! crate's own name and version). The signing certificate is read from a
//! DER file named in settings. Companion packages are probed with
//! `pm path <package>` on Android and looked up as executables on `PATH`
//! elsewhere.
//!
//! [`PackageMetadata`]: crate::application::port::PackageMetadata

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::application::port::{PackageError, PackageMetadata};
use crate::config::Config;
use crate::domain::diagnostics::AppIdentity;

/// How companion packages are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackageProbe {
    /// Ask the Android package manager (`pm path <package>`).
    PackageManager,
    /// Look for an executable of that name on `PATH`.
    SearchPath,
}

impl Default for PackageProbe {
    fn default() -> Self {
        if cfg!(target_os = "android") {
            Self::PackageManager
        } else {
            Self::SearchPath
        }
    }
}

/// Package metadata of the running host.
#[derive(Debug, Clone)]
pub struct HostPackageMetadata {
    identity: AppIdentity,
    certificate_path: Option<PathBuf>,
    probe: PackageProbe,
}

impl HostPackageMetadata {
    #[must_use]
    pub fn new(identity: AppIdentity, certificate_path: Option<PathBuf>) -> Self {
        Self {
            identity,
            certificate_path,
            probe: PackageProbe::default(),
        }
    }

    /// Identity and certificate location from settings.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let identity = AppIdentity::new(
            config.app_name(),
            config
                .version_name
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            config.version_code.unwrap_or_default(),
        );
        Self::new(identity, config.certificate_path.clone())
    }
}

impl PackageMetadata for HostPackageMetadata {
    fn own_identity(&self) -> Result<AppIdentity, PackageError> {
        Ok(self.identity.clone())
    }

    fn own_signing_certificate(&self) -> Result<Vec<u8>, PackageError> {
        let Some(path) = &self.certificate_path else {
            return Err(PackageError::NotFound(
                "no signing certificate configured".to_string(),
            ));
        };
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(PackageError::NotFound(path.display().to_string()))
            }
            Err(err) => Err(PackageError::Unavailable(format!(
                "cannot read {}: {err}",
                path.display()
            ))),
        }
    }

    fn is_package_installed(&self, name: &str) -> Result<bool, PackageError> {
        match self.probe {
            PackageProbe::PackageManager => query_package_manager(name),
            PackageProbe::SearchPath => {
                let search_path = env::var_os("PATH")
                    .ok_or_else(|| PackageError::Unavailable("PATH is not set".to_string()))?;
                Ok(find_on_path(name, &search_path))
            }
        }
    }
}

/// `pm path` prints `package:/data/app/...` for installed packages and
/// nothing (with a non-zero status) otherwise.
fn query_package_manager(name: &str) -> Result<bool, PackageError> {
    let output = Command::new("pm")
        .args(["path", name])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|err| PackageError::Unavailable(format!("cannot run pm: {err}")))?;

    Ok(output.status.success() && has_package_line(&String::from_utf8_lossy(&output.stdout)))
}

fn has_package_line(stdout: &str) -> bool {
    stdout.lines().any(|line| line.starts_with("package:"))
}

/// Whether a regular file called `name` exists in any `PATH` entry.
fn find_on_path(name: &str, search_path: &OsStr) -> bool {
    env::split_paths(search_path).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}
