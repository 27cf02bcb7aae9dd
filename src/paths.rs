// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for application directories.
//!
//! # Path Resolution Order
//!
//! Paths are resolved in the following priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **CLI arguments** (`--cache-dir`, `--config-dir`) - set via [`init_cli_overrides`]
//! 3. **Environment variables** (`SELFCHECK_CACHE_DIR`, `SELFCHECK_CONFIG_DIR`)
//! 4. **Platform default** - via `dirs` crate
//!
//! The cache directory holds the log attachment and crash reports; the config
//! directory holds `settings.toml`.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "selfcheck";

/// Environment variable to override the cache directory.
pub const ENV_CACHE_DIR: &str = "SELFCHECK_CACHE_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "SELFCHECK_CONFIG_DIR";

static CLI_CACHE_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Records `--cache-dir` / `--config-dir` from the command line.
///
/// Only the first call has any effect.
pub fn init_cli_overrides(cache_dir: Option<String>, config_dir: Option<String>) {
    let _ = CLI_CACHE_DIR.set(cache_dir.map(PathBuf::from));
    let _ = CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from));
}

fn resolve(
    override_path: Option<PathBuf>,
    cli: &OnceLock<Option<PathBuf>>,
    env_var: &str,
    platform_default: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = cli.get().and_then(Clone::clone) {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(env_var) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    platform_default.map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

/// Returns the scoped cache directory used for report attachments.
///
/// - Linux: `~/.cache/selfcheck/`
/// - macOS: `~/Library/Caches/selfcheck/`
/// - Windows: `C:\Users\<User>\AppData\Local\selfcheck\`
pub fn get_cache_dir() -> Option<PathBuf> {
    get_cache_dir_with_override(None)
}

/// Returns the cache directory with an optional override (highest priority).
pub fn get_cache_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(override_path, &CLI_CACHE_DIR, ENV_CACHE_DIR, dirs::cache_dir())
}

/// Returns the application config directory path.
pub fn get_config_dir() -> Option<PathBuf> {
    get_config_dir_with_override(None)
}

/// Returns the config directory with an optional override (highest priority).
pub fn get_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(
        override_path,
        &CLI_CONFIG_DIR,
        ENV_CONFIG_DIR,
        dirs::config_dir(),
    )
}
