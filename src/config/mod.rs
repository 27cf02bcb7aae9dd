// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, loading and saving
//! support settings to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use selfcheck::config::{self, Config};
//!
//! let mut config = config::load().unwrap_or_default();
//! config.support_recipients = vec!["support@example.org".to_string()];
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::diagnostics::{MetadataTimeout, ReadTimeout};
use crate::error::{Error, Result};
use crate::paths;

pub use defaults::*;

const CONFIG_FILE: &str = "settings.toml";

/// A named companion package whose presence is reported as an auxiliary flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionPackage {
    /// Human-readable label printed in the report body.
    pub label: String,
    /// Package (or program) name to probe.
    pub package: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application name used in the identity line and subject.
    #[serde(default)]
    pub app_name: Option<String>,
    /// Version name override; defaults to the crate version.
    #[serde(default)]
    pub version_name: Option<String>,
    /// Build number.
    #[serde(default)]
    pub version_code: Option<u64>,
    /// Addresses the report is addressed to.
    #[serde(default)]
    pub support_recipients: Vec<String>,
    #[serde(default)]
    pub report_prompt: Option<String>,
    #[serde(default = "default_companions")]
    pub companion_packages: Vec<CompanionPackage>,
    /// Log-dump command line; program first.
    #[serde(default)]
    pub log_command: Option<Vec<String>>,
    #[serde(default)]
    pub log_read_timeout_secs: Option<u64>,
    #[serde(default)]
    pub metadata_timeout_secs: Option<u64>,
    /// Where `logcat.txt` is written; defaults to the cache directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// DER-encoded signing certificate of this build.
    #[serde(default)]
    pub certificate_path: Option<PathBuf>,
    #[serde(default)]
    pub fingerprint_algorithm: Option<String>,
}

fn default_companions() -> Vec<CompanionPackage> {
    vec![CompanionPackage {
        label: DEFAULT_COMPANION_LABEL.to_string(),
        package: DEFAULT_COMPANION_PACKAGE.to_string(),
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: None,
            version_name: None,
            version_code: None,
            support_recipients: Vec::new(),
            report_prompt: None,
            companion_packages: default_companions(),
            log_command: None,
            log_read_timeout_secs: Some(DEFAULT_LOG_READ_TIMEOUT_SECS),
            metadata_timeout_secs: Some(DEFAULT_METADATA_TIMEOUT_SECS),
            output_dir: None,
            certificate_path: None,
            fingerprint_algorithm: Some(DEFAULT_FINGERPRINT_ALGORITHM.to_string()),
        }
    }
}

impl Config {
    /// Application name, falling back to the crate name.
    #[must_use]
    pub fn app_name(&self) -> String {
        self.app_name
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
    }

    #[must_use]
    pub fn report_prompt(&self) -> &str {
        self.report_prompt.as_deref().unwrap_or(DEFAULT_REPORT_PROMPT)
    }

    /// Log-dump command line, falling back to `logcat -d -v threadtime`.
    #[must_use]
    pub fn log_command(&self) -> Vec<String> {
        match &self.log_command {
            Some(command) if !command.is_empty() => command.clone(),
            _ => DEFAULT_LOG_COMMAND.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn log_read_timeout(&self) -> ReadTimeout {
        ReadTimeout::new(
            self.log_read_timeout_secs
                .unwrap_or(DEFAULT_LOG_READ_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn metadata_timeout(&self) -> MetadataTimeout {
        MetadataTimeout::new(
            self.metadata_timeout_secs
                .unwrap_or(DEFAULT_METADATA_TIMEOUT_SECS),
        )
    }

    /// Output directory for the attachment, if one can be determined.
    #[must_use]
    pub fn output_dir(&self) -> Option<PathBuf> {
        paths::get_cache_dir_with_override(self.output_dir.clone())
    }

    #[must_use]
    pub fn fingerprint_algorithm(&self) -> &str {
        self.fingerprint_algorithm
            .as_deref()
            .unwrap_or(DEFAULT_FINGERPRINT_ALGORITHM)
    }
}

/// Location of `settings.toml`, if a config directory can be determined.
#[must_use]
pub fn settings_path() -> Option<PathBuf> {
    paths::get_config_dir().map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads settings from the config directory, or defaults if none exist.
pub fn load() -> Result<Config> {
    if let Some(path) = settings_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

/// Writes settings to the config directory. Does nothing if there is none.
pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = settings_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Loads settings from `path`. Unparseable files fall back to defaults.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| Error::file_io(path, e))?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "invalid settings, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::file_io(parent, e))?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(|e| Error::file_io(path, e))?;
    Ok(())
}
