// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port` for a real host.
//!
//! # Available Adapters
//!
//! - [`package`]: Identity and certificate from settings, companion lookup
//!   (implements [`PackageMetadata`])
//! - [`platform`]: Build properties via `sysinfo` or `getprop`
//!   (implements [`BuildPropertySource`])
//! - [`log_source`]: `logcat`-style subprocess (implements [`LogSource`])
//! - [`presenter`]: Mail draft or JSON on stdout (implements [`Presenter`])
//!
//! [`PackageMetadata`]: crate::application::port::PackageMetadata
//! [`BuildPropertySource`]: crate::application::port::BuildPropertySource
//! [`LogSource`]: crate::application::port::LogSource
//! [`Presenter`]: crate::application::port::Presenter

pub mod log_source;
pub mod package;
pub mod platform;
pub mod presenter;

pub use log_source::CommandLogSource;
pub use package::HostPackageMetadata;
pub use platform::{default_build_properties, GetpropBuildProperties, SystemBuildProperties};
pub use presenter::{ConsolePresenter, OutputFormat};
