// SPDX-License-Identifier: MPL-2.0
//! Build-property port definition.

use crate::domain::diagnostics::PlatformInfo;

/// Read-only source of the host's static build properties.
///
/// Reads cannot fail: properties the host does not expose are reported as
/// [`UNKNOWN_PROPERTY`](crate::domain::diagnostics::UNKNOWN_PROPERTY).
pub trait BuildPropertySource: Send + Sync {
    /// Captures every property at once.
    fn snapshot(&self) -> PlatformInfo;
}
