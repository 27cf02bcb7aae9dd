// SPDX-License-Identifier: MPL-2.0
//! Package-metadata port definitions.
//!
//! The host's package-metadata store answers three questions about this
//! build: who it is, which certificate signed it, and whether a named
//! companion package is present. "Not found" is reported separately from
//! every other failure.

use std::fmt;

use crate::domain::diagnostics::AppIdentity;
use crate::error::Error;

// =============================================================================
// PackageError
// =============================================================================

/// Errors returned by a package-metadata query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageError {
    /// The queried package (or its certificate) does not exist.
    NotFound(String),

    /// The store could not be queried (IPC failure, permission, I/O).
    Unavailable(String),
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageError::NotFound(name) => write!(f, "package not found: {name}"),
            PackageError::Unavailable(msg) => write!(f, "package metadata unavailable: {msg}"),
        }
    }
}

impl std::error::Error for PackageError {}

impl From<PackageError> for Error {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::NotFound(name) => Error::MetadataUnavailable(format!("not found: {name}")),
            PackageError::Unavailable(msg) => Error::MetadataUnavailable(msg),
        }
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Read access to this build's own package metadata.
pub trait PackageMetadata: Send + Sync {
    /// Name, version name and build number of the running build.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::NotFound` if the running package is unknown to
    /// the store, `PackageError::Unavailable` for any other failure.
    fn own_identity(&self) -> Result<AppIdentity, PackageError>;

    /// Raw bytes of the certificate that signed the running build.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::NotFound` if no certificate is recorded.
    fn own_signing_certificate(&self) -> Result<Vec<u8>, PackageError>;

    /// Whether `name` is installed.
    ///
    /// A missing package is `Ok(false)`; `Err` means the lookup itself failed.
    fn is_package_installed(&self, name: &str) -> Result<bool, PackageError>;
}

/// The narrow view the integrity verifier needs.
pub trait SigningIdentity {
    /// Raw bytes of the certificate that signed the running build.
    ///
    /// # Errors
    ///
    /// Any failure to produce the certificate.
    fn signing_certificate(&self) -> Result<Vec<u8>, PackageError>;
}

impl<T: PackageMetadata + ?Sized> SigningIdentity for T {
    fn signing_certificate(&self) -> Result<Vec<u8>, PackageError> {
        self.own_signing_certificate()
    }
}
