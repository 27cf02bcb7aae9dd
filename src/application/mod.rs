// SPDX-License-Identifier: MPL-2.0
//! Application layer - Ports for the host collaborators.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The verifier and the collector only ever see these traits
//!
//! # Example
//!
//! ```ignore
//! use selfcheck::application::port::BuildPropertySource;
//! use selfcheck::domain::diagnostics::PlatformInfo;
//!
//! struct FixedProperties(PlatformInfo);
//!
//! impl BuildPropertySource for FixedProperties {
//!     fn snapshot(&self) -> PlatformInfo {
//!         self.0.clone()
//!     }
//! }
//! ```

pub mod port;
