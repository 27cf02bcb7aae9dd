// SPDX-License-Identifier: MPL-2.0
//! `selfcheck` verifies that a build was signed with the expected certificate
//! and collects support reports (device details plus a filtered process log)
//! for sharing with the developers.
//!
//! # Architecture
//!
//! - [`domain`]: Plain value types with no external dependencies
//! - [`application`]: Port traits for the host's package store, build
//!   properties, device log and share mechanism
//! - [`infrastructure`]: Adapters implementing those ports
//! - [`integrity`]: Signing-certificate fingerprint check
//! - [`diagnostics`]: Background collection and foreground presentation of
//!   support reports
//! - [`crash`]: Panic hook writing structured crash reports

#![doc(html_root_url = "https://docs.rs/selfcheck/0.1.0")]

pub mod application;
pub mod config;
pub mod crash;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod integrity;
pub mod logging;
pub mod paths;
