// SPDX-License-Identifier: MPL-2.0
//! Diagnostics newtypes.
//!
//! This module provides type-safe wrappers for collection deadlines,
//! ensuring they are always within valid ranges.

use std::time::Duration;

// =============================================================================
// Bounds
// =============================================================================

/// Log read deadline bounds (1 to 600 seconds).
pub mod read_timeout_bounds {
    /// Minimum deadline in seconds.
    pub const MIN: u64 = 1;
    /// Maximum deadline in seconds.
    pub const MAX: u64 = 600;
    /// Default deadline in seconds.
    pub const DEFAULT: u64 = 30;
}

/// Metadata query deadline bounds (1 to 120 seconds).
pub mod metadata_timeout_bounds {
    /// Minimum deadline in seconds.
    pub const MIN: u64 = 1;
    /// Maximum deadline in seconds.
    pub const MAX: u64 = 120;
    /// Default deadline in seconds.
    pub const DEFAULT: u64 = 10;
}

// =============================================================================
// ReadTimeout
// =============================================================================

/// Deadline for draining the log-dump subprocess.
///
/// # Example
///
/// ```
/// use selfcheck::domain::diagnostics::ReadTimeout;
///
/// let timeout = ReadTimeout::new(45);
/// assert_eq!(timeout.value(), 45);
///
/// // Values outside range are clamped
/// assert_eq!(ReadTimeout::new(0).value(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeout(u64);

impl ReadTimeout {
    /// Creates a new deadline in seconds, clamping to valid range.
    #[must_use]
    pub fn new(secs: u64) -> Self {
        Self(secs.clamp(read_timeout_bounds::MIN, read_timeout_bounds::MAX))
    }

    /// Returns the value in seconds.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for ReadTimeout {
    fn default() -> Self {
        Self(read_timeout_bounds::DEFAULT)
    }
}

// =============================================================================
// MetadataTimeout
// =============================================================================

/// Deadline for a single package-metadata query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataTimeout(u64);

impl MetadataTimeout {
    /// Creates a new deadline in seconds, clamping to valid range.
    #[must_use]
    pub fn new(secs: u64) -> Self {
        Self(secs.clamp(metadata_timeout_bounds::MIN, metadata_timeout_bounds::MAX))
    }

    /// Returns the value in seconds.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for MetadataTimeout {
    fn default() -> Self {
        Self(metadata_timeout_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_timeout_clamps() {
        assert_eq!(ReadTimeout::new(0).value(), read_timeout_bounds::MIN);
        assert_eq!(ReadTimeout::new(100_000).value(), read_timeout_bounds::MAX);
    }

    #[test]
    fn read_timeout_default() {
        assert_eq!(ReadTimeout::default().value(), read_timeout_bounds::DEFAULT);
        assert_eq!(
            ReadTimeout::default().as_duration(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn metadata_timeout_clamps() {
        assert_eq!(MetadataTimeout::new(0).value(), metadata_timeout_bounds::MIN);
        assert_eq!(
            MetadataTimeout::new(500).value(),
            metadata_timeout_bounds::MAX
        );
        assert_eq!(MetadataTimeout::new(5).value(), 5);
    }
}
