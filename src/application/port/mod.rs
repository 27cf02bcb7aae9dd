// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! These traits model the external collaborators of the verifier and the
//! collector. Infrastructure adapters implement them for a real host; tests
//! implement them with fixed data.
//!
//! # Available Ports
//!
//! - [`package`]: Own identity, signing certificate, companion-package lookup
//! - [`platform`]: Static build properties
//! - [`log_source`]: One-shot dump of the device log
//! - [`presenter`]: Displays or forwards the composed report
//!
//! # Design Notes
//!
//! - Background collaborators are `Send + Sync`; they are shared with the
//!   collection worker thread
//! - [`Presenter`] is deliberately not `Send`: it is only ever called on the
//!   thread that owns the collector

pub mod log_source;
pub mod package;
pub mod platform;
pub mod presenter;

pub use log_source::{LogDump, LogSource};
pub use package::{PackageError, PackageMetadata, SigningIdentity};
pub use platform::BuildPropertySource;
pub use presenter::Presenter;
